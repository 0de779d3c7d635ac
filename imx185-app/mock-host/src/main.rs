use std::{cell::RefCell, collections::BTreeMap, convert::Infallible, fmt::Debug, path::PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use embedded_hal::{
    delay::DelayNs,
    digital::{self, OutputPin},
    i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation},
};
use embedded_hal_mock::eh1::delay::StdSleep;
use imx185_core::utils::{
    FixedPoint, SENSOR_CHANNEL, SensorCommand, SensorConfig, SensorController,
    controllers::{
        Control, ControlId, SensorError,
        controls::{CONTROL_CONFIG_LIST, ControlConfig},
        power::{AlwaysOn, ClockProvider, PlatformError, acquire_clocks},
        registers::{FUSE_ID_ADDR, STANDBY_ADDR},
    },
};
use tracing::{debug, info};

#[derive(Parser)]
#[clap(version = "1.0", about = "Drive the IMX185 core against a simulated register file")]
struct Opts {
    /// Sensor configuration as JSON
    #[clap(long)]
    config: Option<PathBuf>,
    /// Mode index, overrides the configuration
    #[clap(long)]
    mode: Option<usize>,
    /// Enable HDR before streaming
    #[clap(long)]
    hdr: bool,
    /// Overlay the test pattern on stream start
    #[clap(long)]
    test_pattern: bool,
    /// Analog gain in dB
    #[clap(long)]
    gain: Option<FixedPoint>,
    /// Exposure, same unit as the exposure control
    #[clap(long)]
    exposure: Option<FixedPoint>,
    /// Extra command as JSON, e.g. '{"sc":"get","id":"gain"}'. Repeatable.
    #[clap(long = "command")]
    commands: Vec<String>,
    /// Print the control table and exit
    #[clap(long)]
    list_controls: bool,
    /// Print every register written during the run
    #[clap(long)]
    dump: bool,
}

/// Byte-wide register space behind a 16-bit big-endian pointer.
struct RegisterFile {
    address: u8,
    pointer: u16,
    regs: BTreeMap<u16, u8>,
}

impl RegisterFile {
    fn new(address: u8) -> Self {
        let mut regs = BTreeMap::new();
        for (offset, byte) in [0x1a, 0x85, 0x00, 0x42, 0x7e, 0x01].into_iter().enumerate() {
            regs.insert(FUSE_ID_ADDR + offset as u16, byte);
        }
        Self {
            address,
            pointer: 0,
            regs,
        }
    }
}

impl i2c::ErrorType for RegisterFile {
    type Error = ErrorKind;
}

impl I2c for RegisterFile {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let bytes: &[u8] = bytes;
                    let [hi, lo, data @ ..] = bytes else {
                        return Err(ErrorKind::Other);
                    };
                    self.pointer = u16::from_be_bytes([*hi, *lo]);
                    for (offset, value) in data.iter().enumerate() {
                        let reg = self.pointer.wrapping_add(offset as u16);
                        debug!("0x{:04X} <- 0x{:02X}", reg, value);
                        if reg == STANDBY_ADDR {
                            info!(standby = *value != 0, "sensor standby");
                        }
                        self.regs.insert(reg, *value);
                    }
                }
                Operation::Read(buf) => {
                    for (offset, slot) in buf.iter_mut().enumerate() {
                        let reg = self.pointer.wrapping_add(offset as u16);
                        *slot = self.regs.get(&reg).copied().unwrap_or(0);
                    }
                }
            }
        }
        Ok(())
    }
}

/// XCLR line that only reports its level.
struct ResetLine;

impl digital::ErrorType for ResetLine {
    type Error = Infallible;
}

impl OutputPin for ResetLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        info!("XCLR low");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        info!("XCLR high");
        Ok(())
    }
}

/// Host sleep, cloneable so the bus and the power sequencer can each own one.
#[derive(Debug, Clone, Copy, Default)]
struct HostDelay;

impl DelayNs for HostDelay {
    fn delay_ns(
        &mut self,
        ns: u32,
    ) {
        StdSleep.delay_ns(ns);
    }
}

/// Clock tree of a Tegra-style carrier board.
struct HostClocks;

impl ClockProvider for HostClocks {
    type Clock = &'static str;

    fn get(
        &mut self,
        name: &str,
    ) -> Result<Self::Clock, PlatformError> {
        ["cam_mclk1", "extperiph1", "pllp_grtba"]
            .into_iter()
            .find(|clk| *clk == name)
            .ok_or(PlatformError::Clock)
    }

    fn set_parent(
        &mut self,
        clock: &Self::Clock,
        parent: &Self::Clock,
    ) -> Result<(), PlatformError> {
        info!("{} parented to {}", clock, parent);
        Ok(())
    }
}

fn sensor_err<E: Debug>(e: SensorError<E>) -> anyhow::Error {
    anyhow!("sensor error: {:?}", e)
}

/// Build a control after checking it against its declared range.
fn checked(
    id: ControlId,
    value: FixedPoint,
) -> Result<Control> {
    let cfg = ControlConfig::find(id).ok_or_else(|| anyhow!("{:?} has no declared range", id))?;
    if !cfg.contains(value.raw()) {
        bail!(
            "{} {} outside [{}, {}]",
            cfg.name,
            value,
            FixedPoint::from_raw(cfg.min),
            FixedPoint::from_raw(cfg.max)
        );
    }
    Control::from_raw(id.raw(), value.raw()).map_err(|e| anyhow!("{:?}", e))
}

fn load_config(opts: &Opts) -> Result<SensorConfig> {
    let mut config = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SensorConfig::default(),
    };
    if let Some(mode) = opts.mode {
        config.mode = mode;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opts: Opts = Opts::parse();

    if opts.list_controls {
        for cfg in CONTROL_CONFIG_LIST.iter() {
            println!(
                "0x{:08X} {:<16} [{}, {}] default {}",
                cfg.id.raw(),
                cfg.name,
                cfg.min,
                cfg.max,
                cfg.default
            );
        }
        return Ok(());
    }

    let config = load_config(&opts)?;
    let mclk = acquire_clocks(
        &mut HostClocks,
        config.mclk_name.as_deref(),
        config.parent_clk_name.as_deref(),
    )
    .map_err(|e| anyhow!("clock setup failed: {:?}", e))?;
    info!(mclk, "master clock acquired");

    let i2c_bus = RefCell::new(RegisterFile::new(config.address));
    let mut ctrl = SensorController::new(&i2c_bus, AlwaysOn, Some(ResetLine), HostDelay, Some(config))
        .map_err(sensor_err)?;
    if opts.test_pattern {
        ctrl.sensor.set_test_pattern(true);
    }
    let fuse_id = ctrl.init().map_err(sensor_err)?;
    println!("fuse id: {}", fuse_id);
    info!(mode = ctrl.sensor.mode().name, "mode selected");

    let mut queue = vec![SensorCommand::Power { on: true }];
    if opts.hdr {
        queue.push(SensorCommand::Set {
            control: Control::HdrEnable(1),
        });
    }
    if let Some(gain) = opts.gain {
        queue.push(SensorCommand::Set {
            control: checked(ControlId::Gain, gain)?,
        });
    }
    if let Some(exposure) = opts.exposure {
        queue.push(SensorCommand::Set {
            control: checked(ControlId::Exposure, exposure)?,
        });
    }
    queue.push(SensorCommand::Stream { on: true });
    for text in &opts.commands {
        let command: SensorCommand =
            serde_json::from_str(text).with_context(|| format!("bad command {}", text))?;
        queue.push(command);
    }
    queue.push(SensorCommand::Stream { on: false });
    queue.push(SensorCommand::Power { on: false });

    let mut handled = 0;
    for command in queue {
        if SENSOR_CHANNEL.try_send(command).is_err() {
            handled += ctrl.process_pending();
            SENSOR_CHANNEL
                .try_send(command)
                .map_err(|_| anyhow!("sensor channel full"))?;
        }
    }
    handled += ctrl.process_pending();
    info!(handled, state = ?ctrl.sensor.state(), "run complete");

    if opts.dump {
        for (reg, value) in i2c_bus.borrow().regs.iter() {
            println!("0x{:04X} 0x{:02X}", reg, value);
        }
    }
    Ok(())
}
