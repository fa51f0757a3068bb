use servolink_channel::BusChannel;
use servolink_frame::BROADCAST_ADDRESS;

use crate::catalog::{cmd, reply_length};
use crate::error::Result;
use crate::session::{Session, SessionConfig};

/// Position/time pair as stored by the servo's motion registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTime {
    /// Absolute position in 0.24-degree steps (1000 = 240 degrees).
    pub position: u16,
    /// Time to reach the position, in milliseconds.
    pub time_ms: u16,
}

/// A min/max pair, used for both angle and input-voltage limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min: i16,
    pub max: i16,
}

/// Position-holding servo mode or continuous-rotation motor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveMode {
    Servo,
    Motor,
}

impl From<u8> for DriveMode {
    fn from(raw: u8) -> Self {
        if raw == 1 {
            DriveMode::Motor
        } else {
            DriveMode::Servo
        }
    }
}

/// Mode register contents: the mode, and the speed when in motor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeStatus {
    pub mode: DriveMode,
    /// Signed speed, -1000..=1000; 0 in servo mode.
    pub speed: i16,
}

/// Whether the servo applies torque to hold its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Unload,
    Load,
}

impl From<u8> for LoadMode {
    fn from(raw: u8) -> Self {
        if raw == 1 {
            LoadMode::Load
        } else {
            LoadMode::Unload
        }
    }
}

/// Power LED state. The firmware encodes ON as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerLed {
    On,
    Off,
}

impl PowerLed {
    fn as_byte(self) -> u8 {
        match self {
            PowerLed::On => 0,
            PowerLed::Off => 1,
        }
    }
}

impl From<u8> for PowerLed {
    fn from(raw: u8) -> Self {
        if raw == 1 {
            PowerLed::Off
        } else {
            PowerLed::On
        }
    }
}

/// Fault conditions the LED blinks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedAlarms {
    pub over_temperature: bool,
    pub over_voltage: bool,
    pub stall: bool,
}

impl LedAlarms {
    const OVER_TEMPERATURE: u8 = 0x1;
    const OVER_VOLTAGE: u8 = 0x2;
    const STALL: u8 = 0x4;

    pub fn bits(self) -> u8 {
        let mut bits = 0;
        if self.over_temperature {
            bits |= Self::OVER_TEMPERATURE;
        }
        if self.over_voltage {
            bits |= Self::OVER_VOLTAGE;
        }
        if self.stall {
            bits |= Self::STALL;
        }
        bits
    }

    pub fn from_bits(bits: u8) -> Self {
        Self {
            over_temperature: bits & Self::OVER_TEMPERATURE != 0,
            over_voltage: bits & Self::OVER_VOLTAGE != 0,
            stall: bits & Self::STALL != 0,
        }
    }
}

/// One bus servo, addressed through an exclusively owned channel.
///
/// Methods map 1:1 onto the servo firmware's command set, with parameters
/// in user units rather than raw bytes. Out-of-range values are clamped to
/// each command's documented range before encoding; the codec below never
/// sees an invalid payload.
pub struct BusServo<C> {
    session: Session<C>,
}

impl<C: BusChannel> BusServo<C> {
    /// Bind servo `id` (254 broadcasts to every servo on the bus).
    pub fn new(channel: C, id: u8) -> Self {
        Self {
            session: Session::new(channel, id),
        }
    }

    /// Bind with explicit session tunables.
    pub fn with_config(channel: C, id: u8, config: SessionConfig) -> Self {
        Self {
            session: Session::with_config(channel, id, config),
        }
    }

    /// The servo id this handle is bound to.
    pub fn id(&self) -> u8 {
        self.session.address()
    }

    /// The underlying session, for diagnostics.
    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    /// Consume the handle and return the channel.
    pub fn into_channel(self) -> C {
        self.session.into_channel()
    }

    /// Immediately start moving to `position` (0.24-degree steps, clamped
    /// to 0..=1000), aiming to arrive in `time_ms` milliseconds. A time too
    /// short for the distance means full speed.
    pub fn move_time_write(&mut self, position: i16, time_ms: u16) -> Result<()> {
        self.session
            .write_command(cmd::MOVE_TIME_WRITE, &move_payload(position, time_ms))
    }

    /// Read back the values set by [`Self::move_time_write`].
    pub fn move_time_read(&mut self) -> Result<MoveTime> {
        let payload = self
            .session
            .request(cmd::MOVE_TIME_READ, &[], reply_length(4))?;
        Ok(decode_move_time(&payload))
    }

    /// Stage a move that only starts once [`Self::move_start`] is issued.
    pub fn move_time_wait_write(&mut self, position: i16, time_ms: u16) -> Result<()> {
        self.session
            .write_command(cmd::MOVE_TIME_WAIT_WRITE, &move_payload(position, time_ms))
    }

    /// Read back the staged move.
    pub fn move_time_wait_read(&mut self) -> Result<MoveTime> {
        let payload = self
            .session
            .request(cmd::MOVE_TIME_WAIT_READ, &[], reply_length(4))?;
        Ok(decode_move_time(&payload))
    }

    /// Start the staged move.
    pub fn move_start(&mut self) -> Result<()> {
        self.session.write_command(cmd::MOVE_START, &[])
    }

    /// Stop moving immediately.
    pub fn move_stop(&mut self) -> Result<()> {
        self.session.write_command(cmd::MOVE_STOP, &[])
    }

    /// Assign a new id to the servo and rebind this handle to it.
    ///
    /// When the current id is unknown, bind the handle to the broadcast id
    /// first; with a single servo on the wire the assignment still lands.
    /// Not idempotent across servos, so never retried blindly.
    pub fn id_write(&mut self, new_id: u8) -> Result<()> {
        self.session.write_command(cmd::ID_WRITE, &[new_id])?;
        self.session.set_address(new_id);
        Ok(())
    }

    /// Read the servo's id. Always issued as broadcast: the question only
    /// makes sense when a single servo of unknown id is on the wire.
    pub fn id_read(&mut self) -> Result<u8> {
        let payload =
            self.session
                .request_as(BROADCAST_ADDRESS, cmd::ID_READ, &[], reply_length(1))?;
        Ok(payload[0])
    }

    /// Set the position offset (homing adjustment) in 0.24-degree steps.
    /// Volatile; persist it with [`Self::angle_offset_write`].
    pub fn angle_offset_adjust(&mut self, offset: i8) -> Result<()> {
        self.session
            .write_command(cmd::ANGLE_OFFSET_ADJUST, &[offset as u8])
    }

    /// Persist the current angle offset to the servo's flash.
    pub fn angle_offset_write(&mut self) -> Result<()> {
        self.session.write_command(cmd::ANGLE_OFFSET_WRITE, &[])
    }

    /// Read the current angle offset.
    pub fn angle_offset_read(&mut self) -> Result<i8> {
        let payload = self
            .session
            .request(cmd::ANGLE_OFFSET_READ, &[], reply_length(1))?;
        Ok(payload[0] as i8)
    }

    /// Set persistent angle limits; movement is confined to them.
    /// `min` clamps to 0..=999, `max` to (min+1)..=1000.
    pub fn angle_limit_write(&mut self, min: i16, max: i16) -> Result<()> {
        let min = min.clamp(0, 999);
        let max = max.min(1000).max(min + 1);
        self.session
            .write_command(cmd::ANGLE_LIMIT_WRITE, &limit_payload(min, max))
    }

    /// Read the current angle limits.
    pub fn angle_limit_read(&mut self) -> Result<Limits> {
        let payload = self
            .session
            .request(cmd::ANGLE_LIMIT_READ, &[], reply_length(4))?;
        Ok(decode_limits(&payload))
    }

    /// Set persistent input-voltage limits in millivolts. Outside them the
    /// servo goes torque-free and blinks its LED. `min` clamps to
    /// 4500..=11999 mV, `max` to (min+1)..=12000 mV.
    pub fn vin_limit_write(&mut self, min_mv: i16, max_mv: i16) -> Result<()> {
        let min = min_mv.clamp(4500, 11999);
        let max = max_mv.min(12000).max(min + 1);
        self.session
            .write_command(cmd::VIN_LIMIT_WRITE, &limit_payload(min, max))
    }

    /// Read the current input-voltage limits in millivolts.
    pub fn vin_limit_read(&mut self) -> Result<Limits> {
        let payload = self
            .session
            .request(cmd::VIN_LIMIT_READ, &[], reply_length(4))?;
        Ok(decode_limits(&payload))
    }

    /// Set the persistent maximum temperature in degrees Celsius, clamped
    /// to 50..=100. Above it the servo goes torque-free.
    pub fn temp_max_limit_write(&mut self, max_deg: u8) -> Result<()> {
        let max_deg = max_deg.clamp(50, 100);
        self.session
            .write_command(cmd::TEMP_MAX_LIMIT_WRITE, &[max_deg])
    }

    /// Read the maximum temperature limit.
    pub fn temp_max_limit_read(&mut self) -> Result<u8> {
        let payload = self
            .session
            .request(cmd::TEMP_MAX_LIMIT_READ, &[], reply_length(1))?;
        Ok(payload[0])
    }

    /// Read the current servo temperature in degrees Celsius.
    pub fn temp_read(&mut self) -> Result<u8> {
        let payload = self.session.request(cmd::TEMP_READ, &[], reply_length(1))?;
        Ok(payload[0])
    }

    /// Read the servo's input voltage in millivolts.
    pub fn vin_read(&mut self) -> Result<u16> {
        let payload = self.session.request(cmd::VIN_READ, &[], reply_length(2))?;
        Ok(le_u16(&payload, 0))
    }

    /// Read the current position in 0.24-degree steps. The servo can sit
    /// slightly past its commanded zero, so the value is signed.
    pub fn pos_read(&mut self) -> Result<i16> {
        let payload = self.session.request(cmd::POS_READ, &[], reply_length(2))?;
        Ok(le_u16(&payload, 0) as i16)
    }

    /// Set servo or motor mode (volatile). In motor mode `speed` gives the
    /// rotation rate and direction, clamped to -1000..=1000.
    pub fn mode_write(&mut self, mode: DriveMode, speed: i16) -> Result<()> {
        let speed = speed.clamp(-1000, 1000);
        let speed = (speed as u16).to_le_bytes();
        let mode = match mode {
            DriveMode::Servo => 0,
            DriveMode::Motor => 1,
        };
        self.session
            .write_command(cmd::MODE_WRITE, &[mode, 0, speed[0], speed[1]])
    }

    /// Read the mode register; speed is 0 in servo mode.
    pub fn mode_read(&mut self) -> Result<ModeStatus> {
        let payload = self.session.request(cmd::MODE_READ, &[], reply_length(4))?;
        Ok(ModeStatus {
            mode: DriveMode::from(payload[0]),
            speed: le_u16(&payload, 2) as i16,
        })
    }

    /// Load (hold position) or unload (free rotation) the output shaft.
    pub fn load_write(&mut self, mode: LoadMode) -> Result<()> {
        let byte = match mode {
            LoadMode::Unload => 0,
            LoadMode::Load => 1,
        };
        self.session.write_command(cmd::LOAD_WRITE, &[byte])
    }

    /// Read the load/unload state.
    pub fn load_read(&mut self) -> Result<LoadMode> {
        let payload = self.session.request(cmd::LOAD_READ, &[], reply_length(1))?;
        Ok(LoadMode::from(payload[0]))
    }

    /// Switch the power LED always-on or always-off.
    pub fn led_ctrl_write(&mut self, led: PowerLed) -> Result<()> {
        self.session
            .write_command(cmd::LED_CTRL_WRITE, &[led.as_byte()])
    }

    /// Read the power LED state.
    pub fn led_ctrl_read(&mut self) -> Result<PowerLed> {
        let payload = self
            .session
            .request(cmd::LED_CTRL_READ, &[], reply_length(1))?;
        Ok(PowerLed::from(payload[0]))
    }

    /// Choose which fault conditions the LED warns about.
    pub fn led_error_write(&mut self, alarms: LedAlarms) -> Result<()> {
        self.session
            .write_command(cmd::LED_ERROR_WRITE, &[alarms.bits()])
    }

    /// Read the configured LED fault warnings.
    pub fn led_error_read(&mut self) -> Result<LedAlarms> {
        let payload = self
            .session
            .request(cmd::LED_ERROR_READ, &[], reply_length(1))?;
        Ok(LedAlarms::from_bits(payload[0]))
    }
}

fn move_payload(position: i16, time_ms: u16) -> [u8; 4] {
    let position = position.clamp(0, 1000) as u16;
    let pos = position.to_le_bytes();
    let time = time_ms.to_le_bytes();
    [pos[0], pos[1], time[0], time[1]]
}

fn limit_payload(min: i16, max: i16) -> [u8; 4] {
    let min = (min as u16).to_le_bytes();
    let max = (max as u16).to_le_bytes();
    [min[0], min[1], max[0], max[1]]
}

fn le_u16(payload: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([payload[at], payload[at + 1]])
}

fn decode_move_time(payload: &[u8]) -> MoveTime {
    MoveTime {
        position: le_u16(payload, 0),
        time_ms: le_u16(payload, 2),
    }
}

fn decode_limits(payload: &[u8]) -> Limits {
    Limits {
        min: le_u16(payload, 0) as i16,
        max: le_u16(payload, 2) as i16,
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use servolink_frame::encode_frame;

    use super::*;
    use crate::catalog::cmd;
    use crate::session::SessionConfig;
    use crate::testing::ScriptedChannel;
    use std::time::Duration;

    fn servo_with_reply(id: u8, command: u8, payload: &[u8]) -> BusServo<ScriptedChannel> {
        let mut wire = BytesMut::new();
        encode_frame(id, command, payload, &mut wire).unwrap();
        BusServo::with_config(
            ScriptedChannel::with_reply(wire.to_vec()),
            id,
            fast_config(),
        )
    }

    fn silent_servo(id: u8) -> BusServo<ScriptedChannel> {
        BusServo::with_config(ScriptedChannel::silent(), id, fast_config())
    }

    fn fast_config() -> SessionConfig {
        SessionConfig {
            reply_timeout: Duration::from_millis(2),
        }
    }

    #[test]
    fn move_time_write_emits_the_documented_frame() {
        let mut servo = silent_servo(5);
        servo.move_time_write(512, 1000).unwrap();

        assert_eq!(
            servo.into_channel().sent,
            vec![0x55, 0x55, 0x05, 0x07, 0x01, 0x00, 0x02, 0xE8, 0x03, 0x05]
        );
    }

    #[test]
    fn move_position_is_clamped_to_range() {
        let mut servo = silent_servo(1);
        servo.move_time_write(1400, 0).unwrap();
        servo.move_time_write(-20, 0).unwrap();

        let sent = servo.into_channel().sent;
        // First frame: position forced to 1000 (0x03E8).
        assert_eq!(&sent[5..7], &[0xE8, 0x03]);
        // Second frame: position forced to 0.
        assert_eq!(&sent[15..17], &[0x00, 0x00]);
    }

    #[test]
    fn move_time_read_decodes_position_and_time() {
        let mut servo = servo_with_reply(2, cmd::MOVE_TIME_READ, &[0x00, 0x02, 0xE8, 0x03]);
        let move_time = servo.move_time_read().unwrap();

        assert_eq!(
            move_time,
            MoveTime {
                position: 512,
                time_ms: 1000
            }
        );
    }

    #[test]
    fn pos_read_is_signed() {
        let mut servo = servo_with_reply(1, cmd::POS_READ, &[0xFE, 0xFF]);
        assert_eq!(servo.pos_read().unwrap(), -2);
    }

    #[test]
    fn vin_read_is_unsigned_millivolts() {
        let mut servo = servo_with_reply(1, cmd::VIN_READ, &7400u16.to_le_bytes());
        assert_eq!(servo.vin_read().unwrap(), 7400);
    }

    #[test]
    fn angle_limits_are_clamped_and_ordered() {
        let mut servo = silent_servo(1);
        servo.angle_limit_write(-50, 2000).unwrap();

        let sent = servo.into_channel().sent;
        assert_eq!(&sent[5..9], &[0x00, 0x00, 0xE8, 0x03]);
    }

    #[test]
    fn angle_limit_max_stays_above_min() {
        let mut servo = silent_servo(1);
        servo.angle_limit_write(500, 200).unwrap();

        let sent = servo.into_channel().sent;
        assert_eq!(le_u16(&sent[5..], 0), 500);
        assert_eq!(le_u16(&sent[5..], 2), 501);
    }

    #[test]
    fn vin_limits_are_clamped_to_supply_range() {
        let mut servo = silent_servo(1);
        servo.vin_limit_write(4000, 13000).unwrap();

        let sent = servo.into_channel().sent;
        assert_eq!(le_u16(&sent[5..], 0), 4500);
        assert_eq!(le_u16(&sent[5..], 2), 12000);
    }

    #[test]
    fn temp_limit_is_clamped() {
        let mut servo = silent_servo(1);
        servo.temp_max_limit_write(30).unwrap();
        servo.temp_max_limit_write(120).unwrap();

        let sent = servo.into_channel().sent;
        assert_eq!(sent[5], 50);
        assert_eq!(sent[12], 100);
    }

    #[test]
    fn mode_write_encodes_mode_and_clamped_speed() {
        let mut servo = silent_servo(1);
        servo.mode_write(DriveMode::Motor, 1500).unwrap();

        let sent = servo.into_channel().sent;
        assert_eq!(sent[5], 1);
        assert_eq!(sent[6], 0);
        assert_eq!(le_u16(&sent[5..], 2), 1000);
    }

    #[test]
    fn mode_read_decodes_motor_reverse_speed() {
        let speed = (-250i16 as u16).to_le_bytes();
        let mut servo = servo_with_reply(1, cmd::MODE_READ, &[1, 0, speed[0], speed[1]]);

        let status = servo.mode_read().unwrap();
        assert_eq!(status.mode, DriveMode::Motor);
        assert_eq!(status.speed, -250);
    }

    #[test]
    fn id_read_is_broadcast() {
        let mut wire = BytesMut::new();
        encode_frame(3, cmd::ID_READ, &[3], &mut wire).unwrap();
        // Handle bound to id 7; discovery still goes out as a broadcast.
        let mut servo =
            BusServo::with_config(ScriptedChannel::with_reply(wire.to_vec()), 7, fast_config());

        assert_eq!(servo.id_read().unwrap(), 3);
        assert_eq!(servo.into_channel().sent[2], BROADCAST_ADDRESS);
    }

    #[test]
    fn id_write_rebinds_the_handle() {
        let mut servo = silent_servo(BROADCAST_ADDRESS);
        servo.id_write(4).unwrap();

        assert_eq!(servo.id(), 4);
        let sent = servo.into_channel().sent;
        assert_eq!(sent[2], BROADCAST_ADDRESS);
        assert_eq!(sent[5], 4);
    }

    #[test]
    fn angle_offset_roundtrips_signed_bytes() {
        let mut servo = silent_servo(1);
        servo.angle_offset_adjust(-30).unwrap();
        assert_eq!(servo.into_channel().sent[5], (-30i8) as u8);

        let mut servo = servo_with_reply(1, cmd::ANGLE_OFFSET_READ, &[(-30i8) as u8]);
        assert_eq!(servo.angle_offset_read().unwrap(), -30);
    }

    #[test]
    fn led_error_bits_round_trip() {
        let alarms = LedAlarms {
            over_temperature: true,
            over_voltage: false,
            stall: true,
        };
        assert_eq!(alarms.bits(), 0x5);
        assert_eq!(LedAlarms::from_bits(0x5), alarms);

        let mut servo = silent_servo(1);
        servo.led_error_write(alarms).unwrap();
        assert_eq!(servo.into_channel().sent[5], 0x5);
    }

    #[test]
    fn led_ctrl_on_is_zero_on_the_wire() {
        let mut servo = silent_servo(1);
        servo.led_ctrl_write(PowerLed::On).unwrap();
        servo.led_ctrl_write(PowerLed::Off).unwrap();

        let sent = servo.into_channel().sent;
        assert_eq!(sent[5], 0);
        assert_eq!(sent[12], 1);

        assert_eq!(PowerLed::from(0), PowerLed::On);
        assert_eq!(PowerLed::from(1), PowerLed::Off);
    }

    #[test]
    fn load_modes_encode_and_decode() {
        let mut servo = silent_servo(1);
        servo.load_write(LoadMode::Load).unwrap();
        assert_eq!(servo.into_channel().sent[5], 1);

        let mut servo = servo_with_reply(1, cmd::LOAD_READ, &[0]);
        assert_eq!(servo.load_read().unwrap(), LoadMode::Unload);
    }
}
