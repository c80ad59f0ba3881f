use chrono::{Local, NaiveTime, Timelike};

/// Wall-clock source for live history labels.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveTime;

    /// Current time as zero-padded `HH:MM:SS`.
    fn label(&self) -> String {
        format_hms(self.now())
    }
}

/// Local time of the host, matching what a browser dashboard would show.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

pub fn format_hms(t: NaiveTime) -> String {
    format!("{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second())
}

/// Clock that advances by a fixed step every time it is read.
#[cfg(test)]
pub struct SteppingClock {
    current: parking_lot::Mutex<NaiveTime>,
    step: chrono::Duration,
}

#[cfg(test)]
impl SteppingClock {
    pub fn new(start: NaiveTime, step_secs: i64) -> Self {
        Self {
            current: parking_lot::Mutex::new(start),
            step: chrono::Duration::seconds(step_secs),
        }
    }
}

#[cfg(test)]
impl Clock for SteppingClock {
    fn now(&self) -> NaiveTime {
        let mut current = self.current.lock();
        let t = *current;
        *current = t + self.step;
        t
    }
}
