use std::time::Duration;

/// Source of settle delays.
///
/// Every wait in scadrun goes through a `Clock` so tests can observe the
/// requested delays without actually sleeping.
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// Production clock backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}
