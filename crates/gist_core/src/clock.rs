use std::fmt;

pub trait Clock: Send + Sync + fmt::Debug {
    /// Seconds since the Unix epoch
    fn now(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}
