//! Register transport for the IMX185 over I2C.
//!
//! The sensor uses 16-bit register addresses (sent big-endian) and 8-bit
//! values. Register tables are replayed in order and stop at the first failed
//! transaction.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use super::{
    controls::{ControlError, ControlId},
    power::PlatformError,
    registers::{RegisterWrite, TableEntry},
    translator::TranslateError,
};

/// 7-bit address of the IMX185 with SLAMODE strapped low.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x1A;

/// Errors that can occur while driving the sensor.
#[derive(Debug, PartialEq)]
pub enum SensorError<E: core::fmt::Debug> {
    /// A bus transaction failed.
    Bus(E),
    /// The batched read of the stream overrides failed.
    ControlRead,
    /// Frame rate of zero, or a mode with zero line length.
    InvalidDivisor,
    /// Unknown control id, or a menu index outside the control's menu.
    UnknownControl(u32),
    OutOfRange { control: ControlId, value: i64 },
    ReadOnly(ControlId),
    InvalidMode(u64),
    /// The platform power or clock layer refused the request.
    Platform(PlatformError),
}

impl<E: core::fmt::Debug> From<ControlError> for SensorError<E> {
    fn from(e: ControlError) -> Self {
        match e {
            ControlError::Unknown(id) => SensorError::UnknownControl(id),
            ControlError::OutOfRange { control, value } => {
                SensorError::OutOfRange { control, value }
            }
            ControlError::ReadOnly(id) => SensorError::ReadOnly(id),
        }
    }
}

impl<E: core::fmt::Debug> From<TranslateError> for SensorError<E> {
    fn from(e: TranslateError) -> Self {
        match e {
            TranslateError::InvalidDivisor => SensorError::InvalidDivisor,
            TranslateError::UnknownMenuEntry(id) => SensorError::UnknownControl(id.raw()),
            TranslateError::InvalidMode(m) => SensorError::InvalidMode(m),
        }
    }
}

impl<E: core::fmt::Debug> From<PlatformError> for SensorError<E> {
    fn from(e: PlatformError) -> Self {
        SensorError::Platform(e)
    }
}

/// Byte-wide register access to one sensor on the bus.
pub struct SensorBus<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D, E> SensorBus<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
    E: core::fmt::Debug,
{
    pub fn new(
        i2c: I2C,
        delay: D,
        address: u8,
    ) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    /// Read one register.
    pub fn read_register(
        &mut self,
        reg: u16,
    ) -> Result<u8, SensorError<E>> {
        let mut value = 0;
        self.i2c
            .write_read(
                self.address,
                &reg.to_be_bytes(),
                core::slice::from_mut(&mut value),
            )
            .map_err(SensorError::Bus)?;
        Ok(value)
    }

    /// Write one register.
    pub fn write_register(
        &mut self,
        reg: u16,
        value: u8,
    ) -> Result<(), SensorError<E>> {
        let [hi, lo] = reg.to_be_bytes();
        self.i2c
            .write(self.address, &[hi, lo, value])
            .map_err(|e| {
                tracing::error!("i2c write failed, 0x{:04x} = 0x{:02x}", reg, value);
                SensorError::Bus(e)
            })
    }

    /// Issue `writes` in order, stopping at the first failure.
    pub fn write_all(
        &mut self,
        writes: &[RegisterWrite],
    ) -> Result<(), SensorError<E>> {
        for w in writes {
            self.write_register(w.address, w.value)?;
        }
        Ok(())
    }

    /// Replay a register table, honouring its delay entries.
    pub fn write_table(
        &mut self,
        table: &[TableEntry],
    ) -> Result<(), SensorError<E>> {
        for entry in table {
            match *entry {
                TableEntry::Write(w) => self.write_register(w.address, w.value)?,
                TableEntry::DelayMs(ms) => self.delay.delay_ms(ms),
            }
        }
        Ok(())
    }
}
