use crate::geometry::DisplayType;
use crate::wait::WaitMode;

/// Construction options for [`I2Lcd`](crate::I2Lcd).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Config {
    pub display: DisplayType,
    /// Wait mode used once initialization has completed.
    pub wait: WaitMode,
    /// Busy replies tolerated before a command fails with `BusyTimeout`.
    /// `None` polls forever.
    pub busy_poll_limit: Option<u32>,
}

impl Config {
    /// Options for `display` with busy flag waiting and no poll limit.
    pub fn new(display: DisplayType) -> Self {
        Config {
            display,
            wait: WaitMode::default(),
            busy_poll_limit: None,
        }
    }

    /// Wait mode used once initialized.
    pub fn wait(mut self, wait: WaitMode) -> Self {
        self.wait = wait;
        self
    }

    /// Busy replies tolerated per instruction, `None` for no limit.
    pub fn busy_poll_limit(mut self, limit: Option<u32>) -> Self {
        self.busy_poll_limit = limit;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DisplayType::Lcd16x2)
    }
}
