//! Module Exports
//!
//! This file exports the modules that make up the IMX185 driver core.
//!
//! - `registers`: register map, codec and table entries.
//! - `modes`: mode descriptors and mode register tables.
//! - `controls`: control identities, payloads and the control store.
//! - `translator`: control-to-register translation and sensor state.
//! - `i2c`: register transport and the driver error type.
//! - `power`: rail, reset line and clock sequencing.
//! - `sensor`: the `Imx185` driver itself.

pub mod controls;
/// Register transport over a shared I2C bus.
pub mod i2c;
pub mod modes;
pub mod power;
pub mod registers;
pub mod sensor;
pub mod translator;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::{delay::DelayNs, digital::OutputPin, i2c::I2c};
use embedded_hal_bus::i2c::RefCellDevice;
use serde::{Deserialize, Serialize};

pub use controls::{Control, ControlId, ControlSource, ControlTable, ControlValue, FuseId, Switch};
pub use i2c::{SensorBus, SensorError};
pub use power::{PowerRail, PowerSequencer, PowerState};
pub use sensor::Imx185;

use crate::utils::config::SensorConfig;

/// Channel used to receive sensor commands (`SensorCommand` messages).
pub static SENSOR_CHANNEL: embassy_sync::channel::Channel<
    CriticalSectionRawMutex,
    SensorCommand,
    16,
> = embassy_sync::channel::Channel::new();

/// Requests a host can make of the sensor.
///
/// Serialized as JSON with tag `"sc"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sc", rename_all = "snake_case")]
pub enum SensorCommand {
    /// Change one control.
    Set { control: Control },
    /// Change one control addressed by its numeric host id.
    SetRaw { id: u32, value: i64 },
    /// Read one control.
    Get { id: ControlId },
    /// Start or stop streaming.
    Stream { on: bool },
    /// Switch power.
    Power { on: bool },
}

/// Sensor driver plus its power sequencer over a shared I2C bus.
pub struct SensorController<'a, I2C: 'static, R, P, D, C = ControlTable> {
    pub sensor: Imx185<RefCellDevice<'a, I2C>, D, C>,
    pub power: PowerSequencer<R, P, D>,
}

impl<'a, I2C, R, P, D, E> SensorController<'a, I2C, R, P, D, ControlTable>
where
    I2C: I2c<Error = E> + 'static,
    R: PowerRail,
    P: OutputPin,
    D: DelayNs + Clone,
    E: core::fmt::Debug,
{
    /// Build a controller with the default control store.
    ///
    /// `config` falls back to `SensorConfig::default()`.
    pub fn new(
        i2c_bus: &'a RefCell<I2C>,
        rail: R,
        reset: Option<P>,
        delay: D,
        config: Option<SensorConfig>,
    ) -> Result<Self, SensorError<E>> {
        Self::with_controls(i2c_bus, rail, reset, delay, config, ControlTable::new())
    }
}

impl<'a, I2C, R, P, D, C, E> SensorController<'a, I2C, R, P, D, C>
where
    I2C: I2c<Error = E> + 'static,
    R: PowerRail,
    P: OutputPin,
    D: DelayNs + Clone,
    C: ControlSource,
    E: core::fmt::Debug,
{
    pub fn with_controls(
        i2c_bus: &'a RefCell<I2C>,
        rail: R,
        reset: Option<P>,
        delay: D,
        config: Option<SensorConfig>,
        controls: C,
    ) -> Result<Self, SensorError<E>> {
        let config = config.unwrap_or_default();
        let bus = SensorBus::new(RefCellDevice::new(i2c_bus), delay.clone(), config.address);
        let sensor = Imx185::new(bus, controls, &config)?;

        Ok(SensorController {
            sensor,
            power: PowerSequencer::new(rail, reset, delay),
        })
    }

    /// One-time bring-up: power on, read the fuse id, power off.
    pub fn init(&mut self) -> Result<FuseId, SensorError<E>> {
        self.power.power_on()?;
        let fuse_id = self.sensor.read_fuse_id();
        if let Err(e) = self.power.power_off() {
            tracing::warn!(?e, "power off after identification failed");
        }
        fuse_id
    }

    /// Whether the sensor is currently powered.
    pub fn is_powered(&self) -> bool {
        self.power.is_on()
    }

    /// Execute a `SensorCommand`.
    ///
    /// Returns the control value for `Get`, `None` otherwise.
    pub fn execute_command(
        &mut self,
        command: SensorCommand,
    ) -> Result<Option<ControlValue>, SensorError<E>> {
        match command {
            SensorCommand::Set { control } => {
                self.sensor.set_control(control, self.power.is_on())?;
                Ok(None)
            }
            SensorCommand::SetRaw { id, value } => {
                let control = Control::from_raw(id, value)?;
                self.sensor.set_control(control, self.power.is_on())?;
                Ok(None)
            }
            SensorCommand::Get { id } => Ok(Some(self.sensor.get_control(id))),
            SensorCommand::Stream { on } => {
                self.sensor.set_streaming(on)?;
                Ok(None)
            }
            SensorCommand::Power { on } => {
                if on {
                    self.power.power_on()?;
                } else {
                    self.power.power_off()?;
                }
                Ok(None)
            }
        }
    }

    fn handle(
        &mut self,
        command: SensorCommand,
    ) {
        tracing::info!("Received sensor command: {:?}", command);
        match self.execute_command(command) {
            Ok(Some(value)) => tracing::info!(?value, "control read"),
            Ok(None) => tracing::info!("sensor command executed successfully"),
            Err(e) => tracing::error!(?e, "sensor command failed"),
        }
    }

    /// Drain every command already queued on `SENSOR_CHANNEL`.
    ///
    /// Returns how many were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(command) = SENSOR_CHANNEL.try_receive() {
            self.handle(command);
            handled += 1;
        }
        handled
    }

    /// Serve `SENSOR_CHANNEL` forever.
    pub async fn sensor_ch(&mut self) -> ! {
        loop {
            let command = SENSOR_CHANNEL.receiver().receive().await;
            self.handle(command);
        }
    }
}
