//! Sensor modes: timing descriptors and the register tables that select them.
//!
//! Every mode runs the pixel array from a 74.25 MHz pixel clock; the line
//! length (HMAX) and the default frame length (VMAX) set the frame rate.

use super::registers::{TableEntry, TableEntry::DelayMs, STANDBY_ADDR, XMSTA_ADDR};

/// Shortest frame the sensor supports, also the frame length pinned in HDR.
pub const MIN_FRAME_LENGTH: u16 = 1125;

pub const MIN_EXPOSURE_COARSE_1080P_HDR_SHS1: u16 = 5;
pub const MAX_EXPOSURE_COARSE_1080P_HDR_SHS1: u16 = 70;
pub const MIN_EXPOSURE_COARSE_1080P_HDR_SHS2: u16 = 80;
pub const MAX_EXPOSURE_COARSE_1080P_HDR_SHS2: u16 = 1120;

pub const DEFAULT_MODE: usize = 0;

/// Inclusive coarse-tick range accepted by one shutter path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutterBounds {
    pub min: u16,
    pub max: u16,
}

impl ShutterBounds {
    pub const fn new(
        min: u16,
        max: u16,
    ) -> Self {
        Self { min, max }
    }

    pub fn clamp(
        &self,
        coarse: i64,
    ) -> u16 {
        coarse.clamp(self.min as i64, self.max as i64) as u16
    }
}

/// Read-only timing parameters of one sensor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDescriptor {
    /// Pixel clock in Hz.
    pub pixel_clock: u64,
    /// Line length in pixel clocks (HMAX).
    pub line_length: u32,
    /// SHS1 bounds while HDR is enabled.
    pub hdr_short: ShutterBounds,
    /// SHS2 bounds while HDR is enabled.
    pub hdr_long: ShutterBounds,
}

impl ModeDescriptor {
    pub const fn new(
        pixel_clock: u64,
        line_length: u32,
    ) -> Self {
        Self {
            pixel_clock,
            line_length,
            hdr_short: ShutterBounds::new(
                MIN_EXPOSURE_COARSE_1080P_HDR_SHS1,
                MAX_EXPOSURE_COARSE_1080P_HDR_SHS1,
            ),
            hdr_long: ShutterBounds::new(
                MIN_EXPOSURE_COARSE_1080P_HDR_SHS2,
                MAX_EXPOSURE_COARSE_1080P_HDR_SHS2,
            ),
        }
    }

    pub const fn with_hdr_bounds(
        mut self,
        short: ShutterBounds,
        long: ShutterBounds,
    ) -> Self {
        self.hdr_short = short;
        self.hdr_long = long;
        self
    }
}

/// A selectable mode: its geometry, timing, and register table.
#[derive(Debug, Clone, Copy)]
pub struct SensorMode {
    pub name: &'static str,
    pub width: u16,
    pub height: u16,
    pub descriptor: ModeDescriptor,
    pub table: &'static [TableEntry],
}

const fn w(
    address: u16,
    value: u8,
) -> TableEntry {
    TableEntry::write(address, value)
}

pub const MODE_STOP_STREAM: &[TableEntry] = &[w(STANDBY_ADDR, 0x01), DelayMs(10)];

pub const MODE_START_STREAM: &[TableEntry] = &[
    w(STANDBY_ADDR, 0x00),
    DelayMs(30),
    w(XMSTA_ADDR, 0x00),
    DelayMs(30),
];

/// Vertical colour bars from the internal pattern generator.
pub const MODE_TEST_PATTERN: &[TableEntry] = &[
    w(0x300A, 0x00),
    w(0x300E, 0x00),
    w(0x3089, 0x00),
    w(0x308C, 0x21),
];

const MODE_1920X1080_CROP_30FPS: &[TableEntry] = &[
    w(0x3005, 0x01),
    w(0x3007, 0x50),
    w(0x3009, 0x02),
    w(0x300A, 0xF0),
    w(0x300C, 0x00),
    w(0x3018, 0x65),
    w(0x3019, 0x04),
    w(0x301A, 0x00),
    w(0x301B, 0x98),
    w(0x301C, 0x08),
    w(0x3044, 0xE1),
    w(0x305C, 0x20),
    w(0x305E, 0x20),
    w(0x3063, 0x74),
    w(0x3084, 0x00),
    w(0x3086, 0x10),
    w(0x30CF, 0xE1),
    w(0x30D0, 0x29),
    w(0x30D2, 0x9B),
    w(0x30D3, 0x01),
    DelayMs(10),
];

const MODE_1920X1080_CROP_10BIT_30FPS: &[TableEntry] = &[
    w(0x3005, 0x00),
    w(0x3007, 0x50),
    w(0x3009, 0x02),
    w(0x300A, 0x3C),
    w(0x300C, 0x00),
    w(0x3018, 0x65),
    w(0x3019, 0x04),
    w(0x301A, 0x00),
    w(0x301B, 0x98),
    w(0x301C, 0x08),
    w(0x3044, 0xE0),
    w(0x305C, 0x20),
    w(0x305E, 0x20),
    w(0x3063, 0x74),
    w(0x3084, 0x00),
    w(0x3086, 0x10),
    w(0x30CF, 0xD1),
    w(0x30D0, 0x1B),
    w(0x30D2, 0x5F),
    w(0x30D3, 0x00),
    DelayMs(10),
];

const MODE_1920X1080_CROP_HDR_30FPS: &[TableEntry] = &[
    w(0x3005, 0x01),
    w(0x3007, 0x50),
    w(0x3009, 0x02),
    w(0x300A, 0xF0),
    w(0x300C, 0x21),
    w(0x3018, 0x65),
    w(0x3019, 0x04),
    w(0x301A, 0x00),
    w(0x301B, 0x98),
    w(0x301C, 0x08),
    w(0x3044, 0xE1),
    w(0x305C, 0x20),
    w(0x305E, 0x20),
    w(0x3063, 0x74),
    w(0x3084, 0x00),
    w(0x3086, 0x10),
    w(0x30CF, 0xE1),
    w(0x30D0, 0x29),
    w(0x30D2, 0x9B),
    w(0x30D3, 0x01),
    DelayMs(10),
];

const MODE_1280X720_60FPS: &[TableEntry] = &[
    w(0x3005, 0x01),
    w(0x3007, 0x10),
    w(0x3009, 0x01),
    w(0x300A, 0xF0),
    w(0x300C, 0x00),
    w(0x3018, 0xEE),
    w(0x3019, 0x02),
    w(0x301A, 0x00),
    w(0x301B, 0x72),
    w(0x301C, 0x06),
    w(0x3044, 0xE1),
    w(0x305C, 0x20),
    w(0x305E, 0x20),
    w(0x3063, 0x74),
    w(0x3084, 0x00),
    w(0x3086, 0x10),
    w(0x30CF, 0xE1),
    w(0x30D0, 0x29),
    w(0x30D2, 0x9B),
    w(0x30D3, 0x01),
    DelayMs(10),
];

/// Modes in index order; `SensorModeId` and `SensorConfig::mode` index here.
pub static IMX185_MODES: [SensorMode; 4] = [
    SensorMode {
        name: "1920x1080_crop_30fps",
        width: 1920,
        height: 1080,
        descriptor: ModeDescriptor::new(74_250_000, 2200),
        table: MODE_1920X1080_CROP_30FPS,
    },
    SensorMode {
        name: "1920x1080_crop_10bit_30fps",
        width: 1920,
        height: 1080,
        descriptor: ModeDescriptor::new(74_250_000, 2200),
        table: MODE_1920X1080_CROP_10BIT_30FPS,
    },
    SensorMode {
        name: "1920x1080_crop_hdr_30fps",
        width: 1920,
        height: 1080,
        descriptor: ModeDescriptor::new(74_250_000, 2200),
        table: MODE_1920X1080_CROP_HDR_30FPS,
    },
    SensorMode {
        name: "1280x720_60fps",
        width: 1280,
        height: 720,
        descriptor: ModeDescriptor::new(74_250_000, 1650),
        table: MODE_1280X720_60FPS,
    },
];
