use super::run::launch_error;
use super::{CmdMessage, CmdResult};
use crate::config::{ScadConfig, SlicerConfig};
use crate::error::{Result, ScadError};
use crate::model::OsKind;
use crate::process::{CommandSpec, ProcessRunner};
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Same basename as the input, with the export extension.
pub fn output_path(input: &Path, ext: &str) -> PathBuf {
    input.with_extension(ext.trim_start_matches('.'))
}

/// Command that opens `file` in the slicer on `os`.
pub fn slicer_command(os: OsKind, slicer: &SlicerConfig, file: &Path) -> CommandSpec {
    let file = file.to_string_lossy();
    match os {
        OsKind::MacOs => CommandSpec::new("open")
            .args(["-a", slicer.macos_app.as_str()])
            .arg(file),
        // `start` is a cmd builtin; the empty string is the window title.
        OsKind::Windows => CommandSpec::new("cmd")
            .args(["/C", "start", ""])
            .arg(slicer.windows_exe.as_str())
            .arg(file),
        OsKind::Linux | OsKind::Other => CommandSpec::new(slicer.linux_exe.as_str()).arg(file),
    }
}

/// Exports `input` headlessly, then opens the result in the slicer.
///
/// Export failure aborts before the slicer is touched. Failing to open the
/// slicer only produces a warning.
pub fn run<R: ProcessRunner>(
    runner: &R,
    config: &ScadConfig,
    os: OsKind,
    input: &Path,
) -> Result<CmdResult> {
    let out = output_path(input, config.export_ext());
    let export = CommandSpec::new(config.cad_executable.as_str())
        .arg("-o")
        .arg(out.to_string_lossy())
        .arg(input.to_string_lossy());

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!(
        "Building {}: {}",
        config.export_ext().to_uppercase(),
        out.display()
    )));

    let output = runner
        .run(&export)
        .map_err(|e| launch_error(&config.cad_executable, e))?;
    if !output.is_success() {
        return Err(ScadError::ExportFailed {
            path: out,
            stderr: output.diagnostic(),
        });
    }
    result.add_message(CmdMessage::success(format!(
        "✓ Successfully created: {}",
        out.display()
    )));

    if config.open_slicer {
        result.add_message(open_in_slicer(runner, os, &config.slicer, &out));
    }

    Ok(result.with_output_path(out))
}

fn open_in_slicer<R: ProcessRunner>(
    runner: &R,
    os: OsKind,
    slicer: &SlicerConfig,
    file: &Path,
) -> CmdMessage {
    let cmd = slicer_command(os, slicer, file);
    match runner.run(&cmd) {
        Ok(output) if output.is_success() => CmdMessage::success("✓ Opened in slicer"),
        Ok(output) => {
            warn!(command = %cmd, "slicer exited with an error");
            CmdMessage::warning(format!("Could not open slicer: {}", output.diagnostic()))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => CmdMessage::warning(format!(
            "Could not open slicer: '{}' not found",
            cmd.program
        )),
        Err(e) => CmdMessage::warning(format!("Could not open slicer: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::process::CommandOutput;
    use crate::test_utils::FakeRunner;

    #[test]
    fn test_output_path_swaps_extension() {
        assert_eq!(
            output_path(Path::new("/models/bracket.scad"), "3mf"),
            PathBuf::from("/models/bracket.3mf")
        );
        assert_eq!(
            output_path(Path::new("v1.2.scad"), ".stl"),
            PathBuf::from("v1.2.stl")
        );
        assert_eq!(output_path(Path::new("part"), "3mf"), PathBuf::from("part.3mf"));
    }

    #[test]
    fn test_slicer_command_per_os() {
        let slicer = SlicerConfig::default();
        let file = Path::new("part.3mf");

        assert_eq!(
            slicer_command(OsKind::MacOs, &slicer, file).to_string(),
            "open -a OrcaSlicer part.3mf"
        );
        assert_eq!(
            slicer_command(OsKind::Windows, &slicer, file).args,
            vec!["/C", "start", "", "OrcaSlicer.exe", "part.3mf"]
        );
        assert_eq!(
            slicer_command(OsKind::Linux, &slicer, file).to_string(),
            "orca-slicer part.3mf"
        );
        assert_eq!(
            slicer_command(OsKind::Other, &slicer, file).program,
            "orca-slicer"
        );
    }

    #[test]
    fn test_export_then_open() {
        let runner = FakeRunner::new();
        runner.push_output("openscad", CommandOutput::success());
        runner.push_output("orca-slicer", CommandOutput::success());

        let result = run(
            &runner,
            &ScadConfig::default(),
            OsKind::Linux,
            Path::new("part.scad"),
        )
        .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args, vec!["-o", "part.3mf", "part.scad"]);
        assert!(!calls[0].detached);
        assert_eq!(calls[1].program, "orca-slicer");
        assert_eq!(result.output_path, Some(PathBuf::from("part.3mf")));
        assert!(!result.has_level(MessageLevel::Warning));
    }

    #[test]
    fn test_export_failure_skips_slicer() {
        let runner = FakeRunner::new();
        runner.push_output(
            "openscad",
            CommandOutput::failure(1, "ERROR: Parser error in line 3"),
        );
        runner.push_output("orca-slicer", CommandOutput::success());

        let err = run(
            &runner,
            &ScadConfig::default(),
            OsKind::Linux,
            Path::new("part.scad"),
        )
        .unwrap_err();

        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("Parser error"));
        assert_eq!(runner.programs(), vec!["openscad"]);
    }

    #[test]
    fn test_missing_exporter_is_executable_not_found() {
        let runner = FakeRunner::new();

        let err = run(
            &runner,
            &ScadConfig::default(),
            OsKind::Linux,
            Path::new("part.scad"),
        )
        .unwrap_err();

        assert!(matches!(err, ScadError::ExecutableNotFound(_)));
    }

    #[test]
    fn test_missing_slicer_is_warning() {
        let runner = FakeRunner::new();
        runner.push_output("openscad", CommandOutput::success());

        let result = run(
            &runner,
            &ScadConfig::default(),
            OsKind::Linux,
            Path::new("part.scad"),
        )
        .unwrap();

        let last = result.messages.last().unwrap();
        assert_eq!(last.level, MessageLevel::Warning);
        assert_eq!(last.content, "Could not open slicer: 'orca-slicer' not found");
    }

    #[test]
    fn test_open_slicer_disabled() {
        let runner = FakeRunner::new();
        runner.push_output("openscad", CommandOutput::success());
        let config = ScadConfig {
            open_slicer: false,
            ..Default::default()
        };

        run(&runner, &config, OsKind::MacOs, Path::new("part.scad")).unwrap();

        assert_eq!(runner.programs(), vec!["openscad"]);
    }
}
