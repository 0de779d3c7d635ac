//! Per-sensor configuration.
//!
//! Mirrors what a board description would provide: where the sensor sits on
//! the bus, which clocks feed it, and the start-up mode.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::utils::controllers::{i2c::DEFAULT_I2C_ADDRESS, modes::DEFAULT_MODE};

pub type ClockName = String<32>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// 7-bit bus address.
    pub address: u8,
    /// Master clock name; `cam_mclk1` when absent.
    pub mclk_name: Option<ClockName>,
    pub parent_clk_name: Option<ClockName>,
    /// Index into the mode table selected at start-up.
    pub mode: usize,
    /// Overlay the pattern generator table on every stream start.
    pub test_pattern: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_I2C_ADDRESS,
            mclk_name: None,
            parent_clk_name: None,
            mode: DEFAULT_MODE,
            test_pattern: false,
        }
    }
}
