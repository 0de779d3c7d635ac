//! Control-to-register translation.
//!
//! [`SensorState`] is the per-sensor register state. Translating a control is
//! pure: it yields the register writes to issue and the state to adopt once
//! all of them reached the bus, so a failed write never leaves the state
//! half-updated.

use heapless::Vec;

use super::{
    controls::{Control, ControlId, Switch},
    modes::{ModeDescriptor, SensorMode, MIN_FRAME_LENGTH},
    registers::{
        encode_frame_length, encode_gain, encode_shutter_long, encode_shutter_short, RegisterWrite,
        GROUP_HOLD_ADDR,
    },
};
use crate::utils::math::fixed_point::{FixedPoint, FIXED_POINT_SCALING_FACTOR};

/// Exposure writes SHS1 and, in HDR, SHS2: two pairs at most.
pub const MAX_WRITES_PER_CONTROL: usize = 4;

/// In HDR the long exposure is exactly this many times the short one.
pub const HDR_LONG_EXPOSURE_RATIO: i64 = 16;

pub type Writes = Vec<RegisterWrite, MAX_WRITES_PER_CONTROL>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateError {
    /// Zero frame rate or zero line length.
    InvalidDivisor,
    /// Menu index outside the on/off menu of the given control.
    UnknownMenuEntry(ControlId),
    InvalidMode(u64),
}

/// Register writes for one control plus the state to commit afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub writes: Writes,
    pub state: SensorState,
}

/// Register-level state of one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorState {
    /// Last programmed frame length in lines; `0` until first set.
    pub frame_length: u16,
    pub hdr_enabled: bool,
    pub group_hold_prev: i64,
    pub mode_index: usize,
}

/// `raw * 160 / SCALE / 48`, truncated to the gain byte.
pub fn gain_to_register(gain: FixedPoint) -> u8 {
    let scaled = gain.raw() as i128 * 160 / FIXED_POINT_SCALING_FACTOR as i128 / 48;
    scaled as u8
}

/// Frame length in lines for the requested frame rate.
pub fn frame_length_for(
    mode: &ModeDescriptor,
    frame_rate: FixedPoint,
) -> Result<u16, TranslateError> {
    if frame_rate.is_zero() || mode.line_length == 0 {
        return Err(TranslateError::InvalidDivisor);
    }
    let lines = mode.pixel_clock as i128 * FIXED_POINT_SCALING_FACTOR as i128
        / mode.line_length as i128
        / frame_rate.raw() as i128;
    Ok(lines as u16)
}

/// Exposure expressed in whole lines of the mode.
pub fn coarse_ticks_for(
    mode: &ModeDescriptor,
    exposure: FixedPoint,
) -> Result<i64, TranslateError> {
    if mode.line_length == 0 {
        return Err(TranslateError::InvalidDivisor);
    }
    let ticks = mode.pixel_clock as i128 * exposure.raw() as i128
        / mode.line_length as i128
        / FIXED_POINT_SCALING_FACTOR as i128;
    Ok(ticks.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}

/// Shutter start line for `coarse` lines of exposure in a frame of
/// `frame_length` lines. `coarse` saturates at `frame_length - 1`.
pub fn shutter_value(
    frame_length: u16,
    coarse: i64,
) -> u16 {
    let ceiling = frame_length.saturating_sub(1);
    let coarse = coarse.clamp(0, ceiling as i64) as u16;
    frame_length - coarse - 1
}

impl SensorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame length to program shutters against, `MIN_FRAME_LENGTH` if unset.
    pub fn effective_frame_length(&self) -> u16 {
        if self.frame_length == 0 {
            MIN_FRAME_LENGTH
        } else {
            self.frame_length
        }
    }

    /// Translate `control` against the currently selected mode in `modes`.
    pub fn translate(
        &self,
        modes: &[SensorMode],
        control: &Control,
    ) -> Result<Translation, TranslateError> {
        let mut next = *self;
        let mut writes = Writes::new();

        match *control {
            Control::Gain(raw) => {
                let gain = gain_to_register(raw);
                tracing::debug!(gain, "gain");
                push(&mut writes, &encode_gain(gain));
            }
            Control::FrameRate(raw) => {
                let mode = next.descriptor(modes)?;
                let frame_length = frame_length_for(&mode, raw)?;
                tracing::debug!(frame_length, "frame length");
                next.frame_length = frame_length;
                push(&mut writes, &encode_frame_length(frame_length));
            }
            Control::Exposure(raw) => {
                let mode = next.descriptor(modes)?;
                let coarse = coarse_ticks_for(&mode, raw)?;
                let shs1 = next.shutter_short(&mode, coarse);
                push(&mut writes, &encode_shutter_short(shs1));
                if next.hdr_enabled {
                    let shs2 = next.shutter_long(
                        &mode,
                        coarse.saturating_mul(HDR_LONG_EXPOSURE_RATIO),
                    );
                    push(&mut writes, &encode_shutter_long(shs2));
                }
            }
            Control::GroupHold(index) => {
                let hold = Switch::from_index(index)
                    .ok_or(TranslateError::UnknownMenuEntry(ControlId::GroupHold))?;
                next.group_hold_prev = index;
                let value = if hold.is_on() { 0x1 } else { 0x0 };
                push(&mut writes, &[RegisterWrite::new(GROUP_HOLD_ADDR, value)]);
            }
            Control::HdrEnable(index) => {
                let hdr = Switch::from_index(index)
                    .ok_or(TranslateError::UnknownMenuEntry(ControlId::HdrEnable))?;
                next.hdr_enabled = hdr.is_on();
            }
            Control::SensorModeId(mode) => {
                next.mode_index = usize::try_from(mode)
                    .ok()
                    .filter(|&i| i < modes.len())
                    .ok_or(TranslateError::InvalidMode(mode))?;
            }
        }

        Ok(Translation {
            writes,
            state: next,
        })
    }

    fn descriptor(
        &self,
        modes: &[SensorMode],
    ) -> Result<ModeDescriptor, TranslateError> {
        modes
            .get(self.mode_index)
            .map(|m| m.descriptor)
            .ok_or(TranslateError::InvalidMode(self.mode_index as u64))
    }

    /// SHS1: clamped and pinned to the minimum frame only while HDR is on.
    fn shutter_short(
        &mut self,
        mode: &ModeDescriptor,
        coarse: i64,
    ) -> u16 {
        let coarse = if self.hdr_enabled {
            self.frame_length = MIN_FRAME_LENGTH;
            mode.hdr_short.clamp(coarse) as i64
        } else {
            self.frame_length = self.effective_frame_length();
            coarse
        };
        let shs1 = shutter_value(self.frame_length, coarse);
        tracing::debug!(coarse, shs1, frame_length = self.frame_length, "SHS1");
        shs1
    }

    /// SHS2: HDR only, always clamped and pinned.
    fn shutter_long(
        &mut self,
        mode: &ModeDescriptor,
        coarse: i64,
    ) -> u16 {
        let coarse = mode.hdr_long.clamp(coarse);
        self.frame_length = MIN_FRAME_LENGTH;
        let shs2 = shutter_value(self.frame_length, coarse as i64);
        tracing::debug!(coarse, shs2, frame_length = self.frame_length, "SHS2");
        shs2
    }
}

fn push(
    writes: &mut Writes,
    regs: &[RegisterWrite],
) {
    // Capacity covers the largest control (two pairs).
    let pushed = writes.extend_from_slice(regs);
    debug_assert!(pushed.is_ok(), "MAX_WRITES_PER_CONTROL too small");
}
