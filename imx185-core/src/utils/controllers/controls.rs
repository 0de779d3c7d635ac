//! Control identities, typed payloads and the default control store.
//!
//! Every writable control is a variant of [`Control`] carrying its own typed
//! payload. Numeric identifiers coming from a host framework are decoded once
//! through [`ControlId::try_from`]; past that point dispatch is exhaustive.

use core::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::registers::{FUSE_ID_SIZE, FUSE_ID_STR_SIZE};
use crate::utils::math::fixed_point::{FixedPoint, FIXED_POINT_SCALING_FACTOR};

const USER_CID_BASE: u32 = 0x0098_0900;
const CAMERA_CID_BASE: u32 = 0x009A_2000;

/// Control identities with the numeric ids used by the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum ControlId {
    Exposure = USER_CID_BASE + 0x11,
    Gain = USER_CID_BASE + 0x13,
    GroupHold = CAMERA_CID_BASE + 3,
    HdrEnable = CAMERA_CID_BASE + 4,
    FuseId = CAMERA_CID_BASE + 7,
    SensorModeId = CAMERA_CID_BASE + 10,
    FrameRate = CAMERA_CID_BASE + 11,
}

impl ControlId {
    pub const ALL: [ControlId; 7] = [
        ControlId::Gain,
        ControlId::Exposure,
        ControlId::FrameRate,
        ControlId::GroupHold,
        ControlId::HdrEnable,
        ControlId::FuseId,
        ControlId::SensorModeId,
    ];

    pub const fn raw(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for ControlId {
    type Error = ControlError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        ControlId::ALL
            .iter()
            .copied()
            .find(|id| id.raw() == raw)
            .ok_or(ControlError::Unknown(raw))
    }
}

/// A control change request with its typed payload.
///
/// Serialized as JSON with tag `"c"` and content `"v"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "c", content = "v", rename_all = "snake_case")]
pub enum Control {
    /// Analog gain in dB.
    Gain(FixedPoint),
    Exposure(FixedPoint),
    /// Frames per second.
    FrameRate(FixedPoint),
    /// Index into the on/off menu.
    GroupHold(i64),
    /// Index into the on/off menu.
    HdrEnable(i64),
    SensorModeId(u64),
}

impl Control {
    pub const fn id(&self) -> ControlId {
        match self {
            Control::Gain(_) => ControlId::Gain,
            Control::Exposure(_) => ControlId::Exposure,
            Control::FrameRate(_) => ControlId::FrameRate,
            Control::GroupHold(_) => ControlId::GroupHold,
            Control::HdrEnable(_) => ControlId::HdrEnable,
            Control::SensorModeId(_) => ControlId::SensorModeId,
        }
    }

    /// The value as the host framework stores it (64-bit integer).
    pub const fn raw_value(&self) -> i64 {
        match *self {
            Control::Gain(v) | Control::Exposure(v) | Control::FrameRate(v) => v.raw(),
            Control::GroupHold(i) | Control::HdrEnable(i) => i,
            Control::SensorModeId(m) => m as i64,
        }
    }

    /// Build a control from a host identifier and its raw 64-bit value.
    pub fn from_raw(
        id: u32,
        value: i64,
    ) -> Result<Self, ControlError> {
        match ControlId::try_from(id)? {
            ControlId::Gain => Ok(Control::Gain(FixedPoint::from_raw(value))),
            ControlId::Exposure => Ok(Control::Exposure(FixedPoint::from_raw(value))),
            ControlId::FrameRate => Ok(Control::FrameRate(FixedPoint::from_raw(value))),
            ControlId::GroupHold => Ok(Control::GroupHold(value)),
            ControlId::HdrEnable => Ok(Control::HdrEnable(value)),
            ControlId::SensorModeId => Ok(Control::SensorModeId(value as u64)),
            ControlId::FuseId => Err(ControlError::ReadOnly(ControlId::FuseId)),
        }
    }
}

/// Rejections raised while decoding or storing a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// Unrecognised control id, or a menu index outside the menu of that id.
    Unknown(u32),
    OutOfRange { control: ControlId, value: i64 },
    ReadOnly(ControlId),
}

/// Two-entry on/off menu used by group hold and HDR enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Switch {
    Off,
    On,
}

pub const SWITCH_CTRL_QMENU: [Switch; 2] = [Switch::Off, Switch::On];

impl Switch {
    /// Look up a menu index; `None` when it falls outside the menu.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| SWITCH_CTRL_QMENU.get(i))
            .copied()
    }

    pub const fn is_on(self) -> bool {
        matches!(self, Switch::On)
    }
}

/// How the host presents a control's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Integer,
    /// Index into `SWITCH_CTRL_QMENU`.
    Menu,
}

/// Declared range and default of one integer control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlConfig {
    pub id: ControlId,
    pub name: &'static str,
    pub kind: ControlKind,
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

const S: i64 = FIXED_POINT_SCALING_FACTOR;

/// Integer controls in host registration order. Do not rename entries, hosts
/// look controls up by name.
pub const CONTROL_CONFIG_LIST: [ControlConfig; 6] = [
    ControlConfig {
        id: ControlId::Gain,
        name: "Gain",
        kind: ControlKind::Integer,
        min: 0,
        max: 48 * S,
        default: 0,
    },
    ControlConfig {
        id: ControlId::Exposure,
        name: "Exposure",
        kind: ControlKind::Integer,
        min: 30 * S,
        max: 33000 * S,
        default: 16 * S,
    },
    ControlConfig {
        id: ControlId::FrameRate,
        name: "Frame Rate",
        kind: ControlKind::Integer,
        min: 30 * S,
        max: 30 * S,
        default: 30 * S,
    },
    ControlConfig {
        id: ControlId::GroupHold,
        name: "Group Hold",
        kind: ControlKind::Menu,
        min: 0,
        max: SWITCH_CTRL_QMENU.len() as i64 - 1,
        default: 0,
    },
    ControlConfig {
        id: ControlId::HdrEnable,
        name: "HDR enable",
        kind: ControlKind::Menu,
        min: 0,
        max: SWITCH_CTRL_QMENU.len() as i64 - 1,
        default: 0,
    },
    ControlConfig {
        id: ControlId::SensorModeId,
        name: "Sensor Mode",
        kind: ControlKind::Integer,
        min: i64::MIN,
        max: i64::MAX,
        default: 0,
    },
];

impl ControlConfig {
    pub fn find(id: ControlId) -> Option<&'static ControlConfig> {
        CONTROL_CONFIG_LIST.iter().find(|c| c.id == id)
    }

    pub const fn contains(
        &self,
        value: i64,
    ) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Factory-programmed identifier rendered as lowercase hex.
pub type FuseId = heapless::String<FUSE_ID_STR_SIZE>;

pub fn format_fuse_id(bytes: &[u8; FUSE_ID_SIZE]) -> FuseId {
    let mut id = FuseId::new();
    for b in bytes {
        // Capacity is exactly two digits per byte.
        let _ = write!(id, "{:02x}", b);
    }
    id
}

/// Value returned by a control read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlValue {
    Integer(i64),
    Text(FuseId),
}

/// Gain, frame rate and exposure, re-applied on every stream start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOverrides {
    pub gain: FixedPoint,
    pub frame_rate: FixedPoint,
    pub exposure: FixedPoint,
}

/// The batched override read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlReadError;

/// Host-side control store consulted by the driver.
pub trait ControlSource {
    /// Validate a new value without recording it.
    fn check(
        &self,
        control: &Control,
    ) -> Result<(), ControlError>;

    /// Validate and record a new value.
    fn set(
        &mut self,
        control: &Control,
    ) -> Result<(), ControlError>;

    fn get(
        &self,
        id: ControlId,
    ) -> ControlValue;

    /// Read Gain, FrameRate and Exposure in one batch.
    fn read_overrides(&self) -> Result<StreamOverrides, ControlReadError>;

    fn set_fuse_id(
        &mut self,
        fuse_id: FuseId,
    );
}

/// In-memory control store honouring [`CONTROL_CONFIG_LIST`].
#[derive(Debug, Clone)]
pub struct ControlTable {
    values: [i64; CONTROL_CONFIG_LIST.len()],
    fuse_id: FuseId,
}

impl ControlTable {
    /// Start every control at its declared default, pulled into range.
    pub fn new() -> Self {
        let mut values = [0; CONTROL_CONFIG_LIST.len()];
        for (slot, cfg) in values.iter_mut().zip(CONTROL_CONFIG_LIST.iter()) {
            *slot = cfg.default.clamp(cfg.min, cfg.max);
        }
        Self {
            values,
            fuse_id: FuseId::new(),
        }
    }

    fn slot(id: ControlId) -> Option<usize> {
        CONTROL_CONFIG_LIST.iter().position(|c| c.id == id)
    }

    fn value(
        &self,
        id: ControlId,
    ) -> i64 {
        Self::slot(id).map(|i| self.values[i]).unwrap_or_default()
    }
}

impl Default for ControlTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSource for ControlTable {
    fn check(
        &self,
        control: &Control,
    ) -> Result<(), ControlError> {
        let id = control.id();
        let value = control.raw_value();
        let slot = Self::slot(id).ok_or(ControlError::ReadOnly(id))?;
        let cfg = &CONTROL_CONFIG_LIST[slot];
        if !cfg.contains(value) {
            return Err(match cfg.kind {
                ControlKind::Menu => ControlError::Unknown(id.raw()),
                ControlKind::Integer => ControlError::OutOfRange { control: id, value },
            });
        }
        Ok(())
    }

    fn set(
        &mut self,
        control: &Control,
    ) -> Result<(), ControlError> {
        self.check(control)?;
        if let Some(slot) = Self::slot(control.id()) {
            self.values[slot] = control.raw_value();
        }
        Ok(())
    }

    fn get(
        &self,
        id: ControlId,
    ) -> ControlValue {
        match id {
            ControlId::FuseId => ControlValue::Text(self.fuse_id.clone()),
            other => ControlValue::Integer(self.value(other)),
        }
    }

    fn read_overrides(&self) -> Result<StreamOverrides, ControlReadError> {
        Ok(StreamOverrides {
            gain: FixedPoint::from_raw(self.value(ControlId::Gain)),
            frame_rate: FixedPoint::from_raw(self.value(ControlId::FrameRate)),
            exposure: FixedPoint::from_raw(self.value(ControlId::Exposure)),
        })
    }

    fn set_fuse_id(
        &mut self,
        fuse_id: FuseId,
    ) {
        self.fuse_id = fuse_id;
    }
}
