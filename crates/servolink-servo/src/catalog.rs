//! The per-command catalogue: ids and payload sizes.
//!
//! This is table data, not engine design. The session engine is generic
//! over `(command_id, request_payload, reply_payload)`; numeric ranges and
//! clamping rules live with the typed wrappers in [`crate::servo`].

/// Command ids, numbered as in the servo firmware manual.
pub mod cmd {
    pub const MOVE_TIME_WRITE: u8 = 1;
    pub const MOVE_TIME_READ: u8 = 2;
    pub const MOVE_TIME_WAIT_WRITE: u8 = 7;
    pub const MOVE_TIME_WAIT_READ: u8 = 8;
    pub const MOVE_START: u8 = 11;
    pub const MOVE_STOP: u8 = 12;
    pub const ID_WRITE: u8 = 13;
    pub const ID_READ: u8 = 14;
    pub const ANGLE_OFFSET_ADJUST: u8 = 17;
    pub const ANGLE_OFFSET_WRITE: u8 = 18;
    pub const ANGLE_OFFSET_READ: u8 = 19;
    pub const ANGLE_LIMIT_WRITE: u8 = 20;
    pub const ANGLE_LIMIT_READ: u8 = 21;
    pub const VIN_LIMIT_WRITE: u8 = 22;
    pub const VIN_LIMIT_READ: u8 = 23;
    pub const TEMP_MAX_LIMIT_WRITE: u8 = 24;
    pub const TEMP_MAX_LIMIT_READ: u8 = 25;
    pub const TEMP_READ: u8 = 26;
    pub const VIN_READ: u8 = 27;
    pub const POS_READ: u8 = 28;
    pub const MODE_WRITE: u8 = 29;
    pub const MODE_READ: u8 = 30;
    pub const LOAD_WRITE: u8 = 31;
    pub const LOAD_READ: u8 = 32;
    pub const LED_CTRL_WRITE: u8 = 33;
    pub const LED_CTRL_READ: u8 = 34;
    pub const LED_ERROR_WRITE: u8 = 35;
    pub const LED_ERROR_READ: u8 = 36;
}

/// The length field a reply frame carries for an n-byte reply payload.
pub const fn reply_length(payload: u8) -> u8 {
    payload + 3
}

/// One catalogue entry: id, payload sizes, and whether a reply is solicited.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub id: u8,
    pub name: &'static str,
    /// Request payload size in bytes.
    pub request_payload: u8,
    /// Reply payload size in bytes; `None` for write-only commands.
    pub reply_payload: Option<u8>,
}

/// The full catalogue, in id order.
#[rustfmt::skip]
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec { id: cmd::MOVE_TIME_WRITE, name: "move_time_write", request_payload: 4, reply_payload: None },
    CommandSpec { id: cmd::MOVE_TIME_READ, name: "move_time_read", request_payload: 0, reply_payload: Some(4) },
    CommandSpec { id: cmd::MOVE_TIME_WAIT_WRITE, name: "move_time_wait_write", request_payload: 4, reply_payload: None },
    CommandSpec { id: cmd::MOVE_TIME_WAIT_READ, name: "move_time_wait_read", request_payload: 0, reply_payload: Some(4) },
    CommandSpec { id: cmd::MOVE_START, name: "move_start", request_payload: 0, reply_payload: None },
    CommandSpec { id: cmd::MOVE_STOP, name: "move_stop", request_payload: 0, reply_payload: None },
    CommandSpec { id: cmd::ID_WRITE, name: "id_write", request_payload: 1, reply_payload: None },
    CommandSpec { id: cmd::ID_READ, name: "id_read", request_payload: 0, reply_payload: Some(1) },
    CommandSpec { id: cmd::ANGLE_OFFSET_ADJUST, name: "angle_offset_adjust", request_payload: 1, reply_payload: None },
    CommandSpec { id: cmd::ANGLE_OFFSET_WRITE, name: "angle_offset_write", request_payload: 0, reply_payload: None },
    CommandSpec { id: cmd::ANGLE_OFFSET_READ, name: "angle_offset_read", request_payload: 0, reply_payload: Some(1) },
    CommandSpec { id: cmd::ANGLE_LIMIT_WRITE, name: "angle_limit_write", request_payload: 4, reply_payload: None },
    CommandSpec { id: cmd::ANGLE_LIMIT_READ, name: "angle_limit_read", request_payload: 0, reply_payload: Some(4) },
    CommandSpec { id: cmd::VIN_LIMIT_WRITE, name: "vin_limit_write", request_payload: 4, reply_payload: None },
    CommandSpec { id: cmd::VIN_LIMIT_READ, name: "vin_limit_read", request_payload: 0, reply_payload: Some(4) },
    CommandSpec { id: cmd::TEMP_MAX_LIMIT_WRITE, name: "temp_max_limit_write", request_payload: 1, reply_payload: None },
    CommandSpec { id: cmd::TEMP_MAX_LIMIT_READ, name: "temp_max_limit_read", request_payload: 0, reply_payload: Some(1) },
    CommandSpec { id: cmd::TEMP_READ, name: "temp_read", request_payload: 0, reply_payload: Some(1) },
    CommandSpec { id: cmd::VIN_READ, name: "vin_read", request_payload: 0, reply_payload: Some(2) },
    CommandSpec { id: cmd::POS_READ, name: "pos_read", request_payload: 0, reply_payload: Some(2) },
    CommandSpec { id: cmd::MODE_WRITE, name: "mode_write", request_payload: 4, reply_payload: None },
    CommandSpec { id: cmd::MODE_READ, name: "mode_read", request_payload: 0, reply_payload: Some(4) },
    CommandSpec { id: cmd::LOAD_WRITE, name: "load_write", request_payload: 1, reply_payload: None },
    CommandSpec { id: cmd::LOAD_READ, name: "load_read", request_payload: 0, reply_payload: Some(1) },
    CommandSpec { id: cmd::LED_CTRL_WRITE, name: "led_ctrl_write", request_payload: 1, reply_payload: None },
    CommandSpec { id: cmd::LED_CTRL_READ, name: "led_ctrl_read", request_payload: 0, reply_payload: Some(1) },
    CommandSpec { id: cmd::LED_ERROR_WRITE, name: "led_error_write", request_payload: 1, reply_payload: None },
    CommandSpec { id: cmd::LED_ERROR_READ, name: "led_error_read", request_payload: 0, reply_payload: Some(1) },
];

/// Look up a catalogue entry by command id.
pub fn lookup(id: u8) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use servolink_frame::MAX_PAYLOAD;

    #[test]
    fn catalogue_is_sorted_and_unique() {
        for pair in COMMANDS.windows(2) {
            assert!(pair[0].id < pair[1].id, "{} out of order", pair[1].name);
        }
    }

    #[test]
    fn payload_sizes_fit_the_frame_format() {
        for spec in COMMANDS {
            assert!(usize::from(spec.request_payload) <= MAX_PAYLOAD, "{}", spec.name);
            if let Some(reply) = spec.reply_payload {
                assert!(usize::from(reply) <= MAX_PAYLOAD, "{}", spec.name);
            }
        }
    }

    #[test]
    fn reads_follow_their_writes_in_id_space() {
        let read = lookup(cmd::MOVE_TIME_READ).unwrap();
        assert_eq!(read.reply_payload, Some(4));
        assert_eq!(lookup(cmd::POS_READ).unwrap().reply_payload, Some(2));
        assert!(lookup(cmd::MOVE_START).unwrap().reply_payload.is_none());
        assert!(lookup(0).is_none());
    }

    #[test]
    fn reply_length_counts_command_and_checksum() {
        assert_eq!(reply_length(0), 3);
        assert_eq!(reply_length(4), 7);
    }
}
