use core::{
    cell::RefCell,
    future::Future,
    pin::pin,
    task::{Context, Waker},
};
use std::rc::Rc;

use embedded_hal::{delay::DelayNs, i2c::ErrorKind};
use embedded_hal_bus::i2c::RefCellDevice;
use embedded_hal_mock::eh1::{
    digital::{Mock as PinMock, State as PinState, Transaction as PinTrans},
    i2c::{Mock as I2cMock, Transaction as I2cTrans},
};
use imx185_core::utils::{
    controllers::{
        controls::{ControlError, ControlReadError, FuseId, StreamOverrides},
        i2c::DEFAULT_I2C_ADDRESS,
        modes::{IMX185_MODES, MODE_START_STREAM, MODE_STOP_STREAM, MODE_TEST_PATTERN},
        power::{acquire_clocks, AlwaysOn, ClockProvider, PlatformError, PowerRail},
        registers::{
            encode_frame_length, encode_gain, encode_shutter_long, encode_shutter_short, RegisterWrite, TableEntry,
            GROUP_HOLD_ADDR,
        },
        Control, ControlId, ControlSource, ControlTable, ControlValue, Imx185, PowerSequencer,
        PowerState, SensorBus, SensorError,
    },
    FixedPoint, SensorCommand, SensorConfig, SensorController, FIXED_POINT_SCALING_FACTOR,
    SENSOR_CHANNEL,
};

const ADDR: u8 = DEFAULT_I2C_ADDRESS;

/// Create a register write transaction (16-bit address, 8-bit value).
fn reg_write(
    reg: u16,
    value: u8,
) -> I2cTrans {
    let [hi, lo] = reg.to_be_bytes();
    I2cTrans::write(ADDR, vec![hi, lo, value])
}

/// Create a register read transaction returning `value`.
fn reg_read(
    reg: u16,
    value: u8,
) -> I2cTrans {
    I2cTrans::write_read(ADDR, reg.to_be_bytes().to_vec(), vec![value])
}

fn writes(regs: &[RegisterWrite]) -> Vec<I2cTrans> {
    regs.iter().map(|w| reg_write(w.address, w.value)).collect()
}

fn table(entries: &[TableEntry]) -> Vec<I2cTrans> {
    entries
        .iter()
        .filter_map(|e| match e {
            TableEntry::Write(w) => Some(reg_write(w.address, w.value)),
            TableEntry::DelayMs(_) => None,
        })
        .collect()
}

/// Delay double that records every requested pause in nanoseconds.
#[derive(Clone, Default)]
struct RecordingDelay(Rc<RefCell<Vec<u32>>>);

impl RecordingDelay {
    fn take(&self) -> Vec<u32> {
        core::mem::take(&mut *self.0.borrow_mut())
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(
        &mut self,
        ns: u32,
    ) {
        self.0.borrow_mut().push(ns);
    }
}

type MockSensor<'a, C = ControlTable> = Imx185<RefCellDevice<'a, I2cMock>, RecordingDelay, C>;

fn sensor(i2c_bus: &RefCell<I2cMock>) -> MockSensor<'_> {
    sensor_with(i2c_bus, ControlTable::new(), SensorConfig::default())
}

fn sensor_with<C: ControlSource>(
    i2c_bus: &RefCell<I2cMock>,
    controls: C,
    config: SensorConfig,
) -> MockSensor<'_, C> {
    let bus = SensorBus::new(RefCellDevice::new(i2c_bus), RecordingDelay::default(), ADDR);
    Imx185::new(bus, controls, &config).unwrap()
}

/// Overrides that the default control table yields for mode 0.
fn default_override_writes() -> Vec<I2cTrans> {
    let mut out = writes(&encode_gain(0));
    out.extend(writes(&encode_frame_length(1125)));
    // 30 s of exposure saturates at the frame: SHS1 = 0
    out.extend(writes(&encode_shutter_short(0)));
    out
}

#[test]
fn test_register_access_is_big_endian() {
    let expectations = [reg_write(0x3014, 0x2A), reg_read(0x3382, 0x7F)];
    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut bus = SensorBus::new(RefCellDevice::new(&i2c_bus), RecordingDelay::default(), ADDR);
    bus.write_register(0x3014, 0x2A).unwrap();
    assert_eq!(bus.read_register(0x3382).unwrap(), 0x7F);
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_table_honours_delays_and_stops_at_first_error() {
    let delay = RecordingDelay::default();
    let expectations = [
        reg_write(0x3000, 0x01),
        reg_write(0x3002, 0x00).with_error(ErrorKind::Other),
    ];
    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut bus = SensorBus::new(RefCellDevice::new(&i2c_bus), delay.clone(), ADDR);
    let entries = [
        TableEntry::write(0x3000, 0x01),
        TableEntry::DelayMs(10),
        TableEntry::write(0x3002, 0x00),
        TableEntry::write(0x3003, 0x00),
    ];
    assert_eq!(
        bus.write_table(&entries),
        Err(SensorError::Bus(ErrorKind::Other))
    );
    assert_eq!(delay.take(), vec![10_000_000]);
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_frame_rate_control_programs_vmax() {
    let expectations = [reg_write(0x3019, 0x04), reg_write(0x3018, 0x65)];
    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut imx = sensor(&i2c_bus);
    imx.set_control(Control::FrameRate(FixedPoint::from_int(30)), true)
        .unwrap();
    assert_eq!(imx.state().frame_length, 1125);
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_zero_frame_rate_never_reaches_the_bus() {
    let i2c_bus = RefCell::new(I2cMock::new(&[]));
    let mut imx = sensor(&i2c_bus);
    assert_eq!(
        imx.apply(&Control::FrameRate(FixedPoint::ZERO)),
        Err(SensorError::InvalidDivisor)
    );
    assert_eq!(imx.state().frame_length, 0);
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_group_hold_is_idempotent() {
    let expectations = [
        reg_write(GROUP_HOLD_ADDR, 0x01),
        reg_write(GROUP_HOLD_ADDR, 0x01),
        reg_write(GROUP_HOLD_ADDR, 0x00),
    ];
    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut imx = sensor(&i2c_bus);
    imx.set_control(Control::GroupHold(1), true).unwrap();
    assert_eq!(imx.state().group_hold_prev, 1);
    imx.set_control(Control::GroupHold(1), true).unwrap();
    assert_eq!(imx.state().group_hold_prev, 1);
    imx.set_control(Control::GroupHold(0), true).unwrap();
    assert_eq!(imx.state().group_hold_prev, 0);

    assert_eq!(
        imx.set_control(Control::GroupHold(2), true),
        Err(SensorError::UnknownControl(ControlId::GroupHold.raw()))
    );
    assert_eq!(
        imx.set_control(Control::Gain(FixedPoint::from_int(49)), true),
        Err(SensorError::OutOfRange {
            control: ControlId::Gain,
            value: 49 * FIXED_POINT_SCALING_FACTOR
        })
    );
    assert_eq!(
        imx.apply(&Control::GroupHold(2)),
        Err(SensorError::UnknownControl(ControlId::GroupHold.raw()))
    );
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_failed_write_leaves_state_and_controls_untouched() {
    let expectations = [reg_write(0x3019, 0x04).with_error(ErrorKind::Other)];
    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut imx = sensor(&i2c_bus);
    let before = *imx.state();
    assert_eq!(
        imx.set_control(Control::FrameRate(FixedPoint::from_int(30)), true),
        Err(SensorError::Bus(ErrorKind::Other))
    );
    assert_eq!(*imx.state(), before);
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_unpowered_controls_are_recorded_not_written() {
    let i2c_bus = RefCell::new(I2cMock::new(&[]));
    let mut imx = sensor(&i2c_bus);
    imx.set_control(Control::Gain(FixedPoint::from_int(24)), false)
        .unwrap();
    imx.set_control(Control::HdrEnable(1), false).unwrap();
    assert_eq!(
        imx.get_control(ControlId::Gain),
        ControlValue::Integer(FixedPoint::from_int(24).raw())
    );
    assert!(imx.state().hdr_enabled);
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_stream_start_writes_in_order() {
    let mut expectations = table(MODE_STOP_STREAM);
    expectations.extend(table(IMX185_MODES[0].table));
    expectations.extend(default_override_writes());
    expectations.extend(table(MODE_START_STREAM));

    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut imx = sensor(&i2c_bus);
    imx.set_streaming(true).unwrap();
    assert!(imx.is_streaming());
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_stream_start_with_test_pattern() {
    let mut expectations = table(MODE_STOP_STREAM);
    expectations.extend(table(IMX185_MODES[3].table));
    expectations.extend(writes(&encode_gain(0)));
    // 720p60 line length at 30 fps
    expectations.extend(writes(&encode_frame_length(1500)));
    expectations.extend(writes(&encode_shutter_short(0)));
    expectations.extend(table(MODE_TEST_PATTERN));
    expectations.extend(table(MODE_START_STREAM));

    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let config = SensorConfig {
        mode: 3,
        test_pattern: true,
        ..SensorConfig::default()
    };
    let mut imx = sensor_with(&i2c_bus, ControlTable::new(), config);
    imx.set_streaming(true).unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_stream_stop_only_writes_stop_table() {
    let i2c_bus = RefCell::new(I2cMock::new(&table(MODE_STOP_STREAM)));
    let mut imx = sensor(&i2c_bus);
    imx.set_streaming(false).unwrap();
    assert!(!imx.is_streaming());
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_stop_table_failure_aborts_stream_start() {
    let expectations = [reg_write(0x3000, 0x01).with_error(ErrorKind::Other)];
    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut imx = sensor(&i2c_bus);
    assert_eq!(
        imx.set_streaming(true),
        Err(SensorError::Bus(ErrorKind::Other))
    );
    assert!(!imx.is_streaming());
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_mode_table_failure_aborts_stream_start() {
    let mut expectations = table(MODE_STOP_STREAM);
    expectations.push(table(IMX185_MODES[0].table).remove(0).with_error(ErrorKind::Other));

    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut imx = sensor(&i2c_bus);
    assert_eq!(
        imx.set_streaming(true),
        Err(SensorError::Bus(ErrorKind::Other))
    );
    assert!(!imx.is_streaming());
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_test_pattern_failure_aborts_stream_start() {
    let mut expectations = table(MODE_STOP_STREAM);
    expectations.extend(table(IMX185_MODES[0].table));
    expectations.extend(default_override_writes());
    expectations.push(table(MODE_TEST_PATTERN).remove(0).with_error(ErrorKind::Other));

    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut imx = sensor(&i2c_bus);
    imx.set_test_pattern(true);
    assert_eq!(
        imx.set_streaming(true),
        Err(SensorError::Bus(ErrorKind::Other))
    );
    assert!(!imx.is_streaming());
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_start_table_failure_leaves_stream_stopped() {
    let mut expectations = table(MODE_STOP_STREAM);
    expectations.extend(table(IMX185_MODES[0].table));
    expectations.extend(default_override_writes());
    expectations.push(table(MODE_START_STREAM).remove(0).with_error(ErrorKind::Other));

    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut imx = sensor(&i2c_bus);
    assert_eq!(
        imx.set_streaming(true),
        Err(SensorError::Bus(ErrorKind::Other))
    );
    assert!(!imx.is_streaming());
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_hdr_stream_start_writes_both_shutters() {
    let mut expectations = table(MODE_STOP_STREAM);
    expectations.extend(table(IMX185_MODES[2].table));
    expectations.extend(writes(&encode_gain(0)));
    expectations.extend(writes(&encode_frame_length(1125)));
    // 30 s of exposure clamps to 70 short and 1120 long lines
    expectations.extend(writes(&encode_shutter_short(1054)));
    expectations.extend(writes(&encode_shutter_long(4)));
    expectations.extend(table(MODE_START_STREAM));

    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let config = SensorConfig {
        mode: 2,
        ..SensorConfig::default()
    };
    let mut imx = sensor_with(&i2c_bus, ControlTable::new(), config);
    imx.set_control(Control::HdrEnable(1), false).unwrap();
    assert!(imx.state().hdr_enabled);

    imx.set_streaming(true).unwrap();
    assert!(imx.is_streaming());
    assert_eq!(imx.state().frame_length, 1125);
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_override_failure_does_not_abort_streaming() {
    let mut expectations = table(MODE_STOP_STREAM);
    expectations.extend(table(IMX185_MODES[0].table));
    expectations.push(reg_write(0x3014, 0x00).with_error(ErrorKind::Other));
    expectations.extend(writes(&encode_frame_length(1125)));
    expectations.extend(writes(&encode_shutter_short(0)));
    expectations.extend(table(MODE_START_STREAM));

    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut imx = sensor(&i2c_bus);
    imx.set_streaming(true).unwrap();
    assert!(imx.is_streaming());
    i2c_bus.borrow_mut().done();
}

/// Control store whose batched read always fails.
struct NoOverrides(ControlTable);

impl ControlSource for NoOverrides {
    fn check(
        &self,
        control: &Control,
    ) -> Result<(), ControlError> {
        self.0.check(control)
    }

    fn set(
        &mut self,
        control: &Control,
    ) -> Result<(), ControlError> {
        self.0.set(control)
    }

    fn get(
        &self,
        id: ControlId,
    ) -> ControlValue {
        self.0.get(id)
    }

    fn read_overrides(&self) -> Result<StreamOverrides, ControlReadError> {
        Err(ControlReadError)
    }

    fn set_fuse_id(
        &mut self,
        fuse_id: FuseId,
    ) {
        self.0.set_fuse_id(fuse_id)
    }
}

#[test]
fn test_override_read_failure_degrades() {
    let mut expectations = table(MODE_STOP_STREAM);
    expectations.extend(table(IMX185_MODES[0].table));
    expectations.extend(table(MODE_START_STREAM));

    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut imx = sensor_with(&i2c_bus, NoOverrides(ControlTable::new()), SensorConfig::default());
    assert_eq!(imx.read_overrides(), Err(SensorError::ControlRead));
    imx.set_streaming(true).unwrap();
    assert!(imx.is_streaming());
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_fuse_id_is_read_and_published() {
    let bytes = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB];
    let expectations: Vec<_> = bytes
        .iter()
        .enumerate()
        .map(|(i, &b)| reg_read(0x3382 + i as u16, b))
        .collect();
    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut imx = sensor(&i2c_bus);
    let id = imx.read_fuse_id().unwrap();
    assert_eq!(id.as_str(), "0123456789ab");
    assert_eq!(imx.get_control(ControlId::FuseId), ControlValue::Text(id));
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_power_sequence_toggles_reset() {
    let pin_expectations = [
        PinTrans::set(PinState::Low),
        PinTrans::set(PinState::High),
        PinTrans::set(PinState::Low),
    ];
    let mut pin = PinMock::new(&pin_expectations);
    let delay = RecordingDelay::default();
    let mut power = PowerSequencer::new(AlwaysOn, Some(pin.clone()), delay.clone());

    power.power_on().unwrap();
    assert_eq!(power.state(), PowerState::On);
    assert_eq!(delay.take(), vec![30_000, 30_000]);

    power.power_off().unwrap();
    assert_eq!(power.state(), PowerState::Off);
    assert_eq!(delay.take(), vec![1_000]);
    pin.done();
}

struct BrokenRail;

impl PowerRail for BrokenRail {
    fn power_on(&mut self) -> Result<(), PlatformError> {
        Err(PlatformError::Regulator)
    }

    fn power_off(&mut self) -> Result<(), PlatformError> {
        Err(PlatformError::Regulator)
    }
}

#[test]
fn test_rail_failure_leaves_state_unmarked() {
    let mut pin = PinMock::new(&[]);
    let mut power = PowerSequencer::new(BrokenRail, Some(pin.clone()), RecordingDelay::default());
    assert_eq!(power.power_on(), Err(PlatformError::Regulator));
    assert_eq!(power.state(), PowerState::Off);
    pin.done();
}

#[test]
fn test_controller_init_reads_fuse_id_powered() {
    let expectations: Vec<_> = (0..6u16).map(|i| reg_read(0x3382 + i, 0xF0 + i as u8)).collect();
    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut pin = PinMock::new(&[
        PinTrans::set(PinState::Low),
        PinTrans::set(PinState::High),
        PinTrans::set(PinState::Low),
    ]);
    let mut ctrl = SensorController::new(
        &i2c_bus,
        AlwaysOn,
        Some(pin.clone()),
        RecordingDelay::default(),
        None,
    )
    .unwrap();

    let id = ctrl.init().unwrap();
    assert_eq!(id.as_str(), "f0f1f2f3f4f5");
    assert!(!ctrl.is_powered());
    i2c_bus.borrow_mut().done();
    pin.done();
}

#[test]
fn test_controller_defers_writes_until_powered() {
    let mut expectations = vec![];
    expectations.extend(table(MODE_STOP_STREAM));
    expectations.extend(table(IMX185_MODES[0].table));
    // 12 dB -> 12 * 160 / 48 = 40
    expectations.extend(writes(&encode_gain(40)));
    expectations.extend(writes(&encode_frame_length(1125)));
    expectations.extend(writes(&encode_shutter_short(0)));
    expectations.extend(table(MODE_START_STREAM));
    expectations.push(reg_write(0x3014, 0x0A));

    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut ctrl = SensorController::new(
        &i2c_bus,
        AlwaysOn,
        None::<PinMock>,
        RecordingDelay::default(),
        None,
    )
    .unwrap();

    let gain = |db| SensorCommand::Set {
        control: Control::Gain(FixedPoint::from_int(db)),
    };
    assert_eq!(ctrl.execute_command(gain(12)).unwrap(), None);
    ctrl.execute_command(SensorCommand::Power { on: true }).unwrap();
    ctrl.execute_command(SensorCommand::Stream { on: true })
        .unwrap();
    ctrl.execute_command(gain(3)).unwrap();
    assert_eq!(
        ctrl.execute_command(SensorCommand::Get { id: ControlId::Gain })
            .unwrap(),
        Some(ControlValue::Integer(FixedPoint::from_int(3).raw()))
    );
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_controller_rejects_unknown_and_read_only_ids() {
    let i2c_bus = RefCell::new(I2cMock::new(&[]));
    let mut ctrl = SensorController::new(
        &i2c_bus,
        AlwaysOn,
        None::<PinMock>,
        RecordingDelay::default(),
        None,
    )
    .unwrap();

    assert_eq!(
        ctrl.execute_command(SensorCommand::SetRaw { id: 0x1234, value: 0 }),
        Err(SensorError::UnknownControl(0x1234))
    );
    assert_eq!(
        ctrl.execute_command(SensorCommand::SetRaw {
            id: ControlId::FuseId.raw(),
            value: 0
        }),
        Err(SensorError::ReadOnly(ControlId::FuseId))
    );
    assert_eq!(
        ctrl.execute_command(SensorCommand::Set {
            control: Control::SensorModeId(9)
        }),
        Err(SensorError::InvalidMode(9))
    );
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_channel_commands_are_drained_in_order() {
    let expectations = [
        reg_write(GROUP_HOLD_ADDR, 0x01),
        reg_write(GROUP_HOLD_ADDR, 0x00),
        reg_write(GROUP_HOLD_ADDR, 0x01),
    ];
    let i2c_bus = RefCell::new(I2cMock::new(&expectations));
    let mut ctrl = SensorController::new(
        &i2c_bus,
        AlwaysOn,
        None::<PinMock>,
        RecordingDelay::default(),
        None,
    )
    .unwrap();
    ctrl.power.power_on().unwrap();

    let commands: [SensorCommand; 2] = [
        serde_json::from_str(r#"{"sc":"set","control":{"c":"group_hold","v":1}}"#).unwrap(),
        serde_json::from_str(r#"{"sc":"set_raw","id":10100739,"value":0}"#).unwrap(),
    ];
    for command in commands {
        SENSOR_CHANNEL.try_send(command).unwrap();
    }
    assert_eq!(ctrl.process_pending(), 2);

    SENSOR_CHANNEL
        .try_send(SensorCommand::Set {
            control: Control::GroupHold(1),
        })
        .unwrap();
    {
        let mut serve = pin!(ctrl.sensor_ch());
        let mut cx = Context::from_waker(Waker::noop());
        assert!(serve.as_mut().poll(&mut cx).is_pending());
    }
    assert!(SENSOR_CHANNEL.is_empty());
    assert_eq!(ctrl.sensor.state().group_hold_prev, 1);
    i2c_bus.borrow_mut().done();
}

/// Clock tree holding named clocks; records parent bindings.
#[derive(Default)]
struct FakeClocks {
    known: Vec<&'static str>,
    bindings: Vec<(&'static str, &'static str)>,
    refuse_binding: bool,
}

impl ClockProvider for FakeClocks {
    type Clock = &'static str;

    fn get(
        &mut self,
        name: &str,
    ) -> Result<Self::Clock, PlatformError> {
        self.known.iter().copied().find(|k| *k == name).ok_or(PlatformError::Clock)
    }

    fn set_parent(
        &mut self,
        clock: &Self::Clock,
        parent: &Self::Clock,
    ) -> Result<(), PlatformError> {
        if self.refuse_binding {
            return Err(PlatformError::Clock);
        }
        self.bindings.push((*clock, *parent));
        Ok(())
    }
}

#[test]
fn test_clocks_default_to_cam_mclk1() {
    let mut clocks = FakeClocks {
        known: vec!["cam_mclk1", "pllp_grtba"],
        ..Default::default()
    };
    assert_eq!(acquire_clocks(&mut clocks, None, None), Ok("cam_mclk1"));
    assert!(clocks.bindings.is_empty());

    assert_eq!(
        acquire_clocks(&mut clocks, None, Some("pllp_grtba")),
        Ok("cam_mclk1")
    );
    assert_eq!(clocks.bindings, vec![("cam_mclk1", "pllp_grtba")]);
}

#[test]
fn test_missing_master_clock_is_fatal_missing_parent_is_not() {
    let mut clocks = FakeClocks {
        known: vec!["extperiph1"],
        ..Default::default()
    };
    assert_eq!(
        acquire_clocks(&mut clocks, None, None),
        Err(PlatformError::Clock)
    );
    assert_eq!(
        acquire_clocks(&mut clocks, Some("extperiph1"), Some("missing")),
        Ok("extperiph1")
    );

    clocks.known.push("pllp");
    clocks.refuse_binding = true;
    assert_eq!(
        acquire_clocks(&mut clocks, Some("extperiph1"), Some("pllp")),
        Ok("extperiph1")
    );
    assert!(clocks.bindings.is_empty());
}
