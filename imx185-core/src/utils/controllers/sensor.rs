//! IMX185 driver: control dispatch, stream sequencing and identification.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use super::{
    controls::{Control, ControlId, ControlSource, ControlValue, FuseId, StreamOverrides, format_fuse_id},
    i2c::{SensorBus, SensorError},
    modes::{SensorMode, IMX185_MODES, MODE_START_STREAM, MODE_STOP_STREAM, MODE_TEST_PATTERN},
    registers::{FUSE_ID_ADDR, FUSE_ID_SIZE},
    translator::SensorState,
};
use crate::utils::config::SensorConfig;

/// Register-level driver for one IMX185.
pub struct Imx185<I2C, D, C> {
    bus: SensorBus<I2C, D>,
    controls: C,
    modes: &'static [SensorMode],
    state: SensorState,
    test_pattern: bool,
    streaming: bool,
}

impl<I2C, D, C, E> Imx185<I2C, D, C>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
    C: ControlSource,
    E: core::fmt::Debug,
{
    /// Create a driver using the built-in mode table.
    pub fn new(
        bus: SensorBus<I2C, D>,
        controls: C,
        config: &SensorConfig,
    ) -> Result<Self, SensorError<E>> {
        Self::with_modes(bus, controls, config, &IMX185_MODES)
    }

    /// Create a driver over a custom mode table.
    pub fn with_modes(
        bus: SensorBus<I2C, D>,
        mut controls: C,
        config: &SensorConfig,
        modes: &'static [SensorMode],
    ) -> Result<Self, SensorError<E>> {
        if config.mode >= modes.len() {
            return Err(SensorError::InvalidMode(config.mode as u64));
        }
        controls.set(&Control::SensorModeId(config.mode as u64))?;

        Ok(Self {
            bus,
            controls,
            modes,
            state: SensorState {
                mode_index: config.mode,
                ..SensorState::new()
            },
            test_pattern: config.test_pattern,
            streaming: false,
        })
    }

    pub fn state(&self) -> &SensorState {
        &self.state
    }

    pub fn mode(&self) -> &SensorMode {
        &self.modes[self.state.mode_index]
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn set_test_pattern(
        &mut self,
        enable: bool,
    ) {
        self.test_pattern = enable;
    }

    /// Handle a control change from the host.
    ///
    /// The value is validated and recorded in the control store. While the
    /// sensor is unpowered nothing is written; register-backed controls are
    /// then applied by the next stream start.
    ///
    /// A menu index outside the menu fails with `UnknownControl`, any other
    /// value outside its declared range with `OutOfRange`.
    pub fn set_control(
        &mut self,
        control: Control,
        powered: bool,
    ) -> Result<(), SensorError<E>> {
        self.controls.check(&control)?;
        let translation = self.state.translate(self.modes, &control)?;

        if powered {
            if let Err(e) = self.bus.write_all(&translation.writes) {
                tracing::debug!(?control, "control write failed");
                return Err(e);
            }
            self.state = translation.state;
        } else if translation.writes.is_empty() {
            self.state = translation.state;
        }

        self.controls.set(&control)?;
        Ok(())
    }

    pub fn get_control(
        &self,
        id: ControlId,
    ) -> ControlValue {
        self.controls.get(id)
    }

    /// Translate and write `control` without touching the control store.
    pub fn apply(
        &mut self,
        control: &Control,
    ) -> Result<(), SensorError<E>> {
        let translation = self.state.translate(self.modes, control)?;
        self.bus.write_all(&translation.writes)?;
        self.state = translation.state;
        Ok(())
    }

    /// Batched read of the stream-start overrides.
    pub fn read_overrides(&self) -> Result<StreamOverrides, SensorError<E>> {
        self.controls
            .read_overrides()
            .map_err(|_| SensorError::ControlRead)
    }

    /// Stop the sensor, and when `enable` is set, reprogram and restart it.
    ///
    /// Table failures abort; override failures are logged and skipped.
    pub fn set_streaming(
        &mut self,
        enable: bool,
    ) -> Result<(), SensorError<E>> {
        tracing::debug!(enable, "set streaming");
        self.streaming = false;

        let result = self.stream_sequence(enable);
        match &result {
            Ok(()) if enable => {
                self.streaming = true;
                tracing::info!(mode = self.mode().name, "streaming");
            }
            Ok(()) => tracing::info!("stream stopped"),
            Err(e) => tracing::error!(?e, "error setting stream"),
        }
        result
    }

    fn stream_sequence(
        &mut self,
        enable: bool,
    ) -> Result<(), SensorError<E>> {
        self.bus.write_table(MODE_STOP_STREAM)?;
        if !enable {
            return Ok(());
        }

        let table = self.mode().table;
        self.bus.write_table(table)?;

        match self.read_overrides() {
            Ok(overrides) => self.apply_overrides(overrides),
            Err(e) => tracing::warn!(?e, "failed to get stream overrides"),
        }

        if self.test_pattern {
            self.bus.write_table(MODE_TEST_PATTERN)?;
        }

        self.bus.write_table(MODE_START_STREAM)
    }

    /// Gain, then frame rate, then exposure: the shutter must see the frame
    /// length that the frame rate just produced.
    fn apply_overrides(
        &mut self,
        overrides: StreamOverrides,
    ) {
        let sequence = [
            ("gain", Control::Gain(overrides.gain)),
            ("frame length", Control::FrameRate(overrides.frame_rate)),
            ("exposure", Control::Exposure(overrides.exposure)),
        ];
        for (what, control) in sequence {
            if let Err(e) = self.apply(&control) {
                tracing::error!(?e, "error {} override", what);
            }
        }
    }

    /// Read the factory-programmed identifier and publish it as a control.
    pub fn read_fuse_id(&mut self) -> Result<FuseId, SensorError<E>> {
        let mut bytes = [0u8; FUSE_ID_SIZE];
        for (offset, byte) in bytes.iter_mut().enumerate() {
            *byte = self
                .bus
                .read_register(FUSE_ID_ADDR + offset as u16)
                .map_err(|e| {
                    tracing::error!("can not read fuse id");
                    e
                })?;
        }

        let fuse_id = format_fuse_id(&bytes);
        tracing::info!("fuse id: {}", fuse_id.as_str());
        self.controls.set_fuse_id(fuse_id.clone());
        Ok(fuse_id)
    }
}
