//! Register map and codec for the IMX185.
//!
//! Multi-byte quantities are split big-endian across consecutive 8-bit
//! registers. The sensor exposes MSB/MID/LSB addresses for 20-bit fields, but
//! every value programmed here fits in 16 bits, so only MID then LSB are
//! written, always in that order.

use serde::{Deserialize, Serialize};

/// Standby control: 0x01 standby, 0x00 operating.
pub const STANDBY_ADDR: u16 = 0x3000;
pub const GROUP_HOLD_ADDR: u16 = 0x3001;
/// Master mode start: 0x00 starts the internal sync generator.
pub const XMSTA_ADDR: u16 = 0x3002;
pub const GAIN_ADDR: u16 = 0x3014;

pub const FRAME_LENGTH_ADDR_MSB: u16 = 0x301A;
pub const FRAME_LENGTH_ADDR_MID: u16 = 0x3019;
pub const FRAME_LENGTH_ADDR_LSB: u16 = 0x3018;
pub const COARSE_TIME_SHS1_ADDR_MSB: u16 = 0x3022;
pub const COARSE_TIME_SHS1_ADDR_MID: u16 = 0x3021;
pub const COARSE_TIME_SHS1_ADDR_LSB: u16 = 0x3020;
pub const COARSE_TIME_SHS2_ADDR_MSB: u16 = 0x3025;
pub const COARSE_TIME_SHS2_ADDR_MID: u16 = 0x3024;
pub const COARSE_TIME_SHS2_ADDR_LSB: u16 = 0x3023;

/// First of the factory-programmed identifier bytes.
pub const FUSE_ID_ADDR: u16 = 0x3382;
pub const FUSE_ID_SIZE: usize = 6;
/// Two hex digits per fuse byte.
pub const FUSE_ID_STR_SIZE: usize = FUSE_ID_SIZE * 2;

/// One 8-bit register write at a 16-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterWrite {
    pub address: u16,
    pub value: u8,
}

impl RegisterWrite {
    pub const fn new(
        address: u16,
        value: u8,
    ) -> Self {
        Self { address, value }
    }
}

/// Entry of a register table: either a write or a pause in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEntry {
    Write(RegisterWrite),
    DelayMs(u32),
}

impl TableEntry {
    pub const fn write(
        address: u16,
        value: u8,
    ) -> Self {
        TableEntry::Write(RegisterWrite::new(address, value))
    }
}

impl From<RegisterWrite> for TableEntry {
    fn from(write: RegisterWrite) -> Self {
        TableEntry::Write(write)
    }
}

const fn split_pair(
    mid_addr: u16,
    lsb_addr: u16,
    value: u16,
) -> [RegisterWrite; 2] {
    [
        RegisterWrite::new(mid_addr, (value >> 8) as u8),
        RegisterWrite::new(lsb_addr, (value & 0xff) as u8),
    ]
}

/// VMAX, the frame length in lines.
pub const fn encode_frame_length(frame_length: u16) -> [RegisterWrite; 2] {
    split_pair(FRAME_LENGTH_ADDR_MID, FRAME_LENGTH_ADDR_LSB, frame_length)
}

/// SHS1, the primary (short in HDR) shutter start line.
pub const fn encode_shutter_short(shs1: u16) -> [RegisterWrite; 2] {
    split_pair(COARSE_TIME_SHS1_ADDR_MID, COARSE_TIME_SHS1_ADDR_LSB, shs1)
}

/// SHS2, the long shutter start line used only in HDR.
pub const fn encode_shutter_long(shs2: u16) -> [RegisterWrite; 2] {
    split_pair(COARSE_TIME_SHS2_ADDR_MID, COARSE_TIME_SHS2_ADDR_LSB, shs2)
}

pub const fn encode_gain(gain: u8) -> [RegisterWrite; 1] {
    [RegisterWrite::new(GAIN_ADDR, gain)]
}

/// Reassemble a MID/LSB pair produced by one of the `encode_*` functions.
pub const fn decode_pair(pair: &[RegisterWrite; 2]) -> u16 {
    ((pair[0].value as u16) << 8) | pair[1].value as u16
}
