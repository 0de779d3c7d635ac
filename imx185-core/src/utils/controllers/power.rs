//! Power sequencing for the IMX185.
//!
//! Rails and clocks belong to the platform; this module only orders the rail
//! call against the XCLR reset line and waits out the settle times.

use embassy_time::Duration;
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use serde::{Deserialize, Serialize};

/// Hold time on each edge of the XCLR pulse when leaving reset.
pub const RESET_SETTLE: Duration = Duration::from_micros(30);
/// Wait between dropping the rails and asserting XCLR.
pub const POWER_OFF_SETTLE: Duration = Duration::from_micros(1);

/// Master clock looked up when the configuration names none.
pub const DEFAULT_MCLK_NAME: &str = "cam_mclk1";

/// Failures reported by the platform power and clock layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformError {
    Regulator,
    Clock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    #[default]
    Off,
    On,
}

/// Platform rail control (regulators, master clock gating).
pub trait PowerRail {
    fn power_on(&mut self) -> Result<(), PlatformError>;
    fn power_off(&mut self) -> Result<(), PlatformError>;
}

/// Rails that are hard-wired on; nothing to switch.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOn;

impl PowerRail for AlwaysOn {
    fn power_on(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }

    fn power_off(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }
}

/// Platform clock lookup.
pub trait ClockProvider {
    type Clock;

    fn get(
        &mut self,
        name: &str,
    ) -> Result<Self::Clock, PlatformError>;

    fn set_parent(
        &mut self,
        clock: &Self::Clock,
        parent: &Self::Clock,
    ) -> Result<(), PlatformError>;
}

/// Acquire the master clock and, when named, bind it to its parent.
///
/// A missing master clock is fatal; a missing or unbindable parent is logged
/// and the master clock is returned unbound.
pub fn acquire_clocks<C: ClockProvider>(
    provider: &mut C,
    mclk_name: Option<&str>,
    parent_name: Option<&str>,
) -> Result<C::Clock, PlatformError> {
    let mclk_name = mclk_name.unwrap_or(DEFAULT_MCLK_NAME);
    let mclk = provider.get(mclk_name).map_err(|e| {
        tracing::error!("unable to get clock {}", mclk_name);
        e
    })?;

    if let Some(parent_name) = parent_name {
        match provider.get(parent_name) {
            Ok(parent) => {
                if let Err(e) = provider.set_parent(&mclk, &parent) {
                    tracing::warn!(?e, "unable to bind {} to {}", mclk_name, parent_name);
                }
            }
            Err(_) => tracing::warn!("unable to get parent clock {}", parent_name),
        }
    }

    Ok(mclk)
}

/// Orders the platform rails against the optional XCLR reset line.
pub struct PowerSequencer<R, P, D> {
    rail: R,
    reset: Option<P>,
    delay: D,
    state: PowerState,
}

impl<R, P, D> PowerSequencer<R, P, D>
where
    R: PowerRail,
    P: OutputPin,
    D: DelayNs,
{
    /// Sequencer starting in the `Off` state.
    pub fn new(
        rail: R,
        reset: Option<P>,
        delay: D,
    ) -> Self {
        Self {
            rail,
            reset,
            delay,
            state: PowerState::Off,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == PowerState::On
    }

    /// Enable the rails, then pulse XCLR low to leave reset.
    pub fn power_on(&mut self) -> Result<(), PlatformError> {
        tracing::debug!("power on");
        self.rail.power_on().map_err(|e| {
            tracing::error!(?e, "power on failed");
            e
        })?;

        if self.reset.is_some() {
            self.drive_reset(false);
            self.delay.delay_us(RESET_SETTLE.as_micros() as u32);
            self.drive_reset(true);
            self.delay.delay_us(RESET_SETTLE.as_micros() as u32);
        }

        self.state = PowerState::On;
        Ok(())
    }

    /// Disable the rails, then hold the sensor in reset.
    pub fn power_off(&mut self) -> Result<(), PlatformError> {
        tracing::debug!("power off");
        self.rail.power_off().map_err(|e| {
            tracing::error!(?e, "power off failed");
            e
        })?;

        self.delay.delay_us(POWER_OFF_SETTLE.as_micros() as u32);
        self.drive_reset(false);

        self.state = PowerState::Off;
        Ok(())
    }

    fn drive_reset(
        &mut self,
        high: bool,
    ) {
        if let Some(pin) = self.reset.as_mut() {
            let result = if high { pin.set_high() } else { pin.set_low() };
            if result.is_err() {
                tracing::warn!(high, "XCLR toggle failed");
            }
        }
    }
}
