use serde::Serialize;
use servolink_servo::DriveMode;

use crate::cmd::{PositionArgs, StatusArgs};
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct PositionOutput {
    id: u8,
    position: i16,
}

pub fn run_position(args: PositionArgs, format: OutputFormat) -> CliResult<i32> {
    args.bus.require_unicast("position")?;

    let mut servo = args.bus.open()?;
    let position = servo
        .pos_read()
        .map_err(|err| link_error("position read failed", err))?;

    let out = PositionOutput {
        id: servo.id(),
        position,
    };
    print_record(
        format,
        &out,
        &[
            ("id", out.id.to_string()),
            ("position", out.position.to_string()),
        ],
    );
    Ok(SUCCESS)
}

#[derive(Serialize)]
struct StatusOutput {
    id: u8,
    position: i16,
    temperature_c: u8,
    voltage_mv: u16,
    mode: &'static str,
    speed: i16,
}

pub fn run(args: StatusArgs, format: OutputFormat) -> CliResult<i32> {
    args.bus.require_unicast("status")?;

    let mut servo = args.bus.open()?;

    let position = servo
        .pos_read()
        .map_err(|err| link_error("position read failed", err))?;
    let temperature_c = servo
        .temp_read()
        .map_err(|err| link_error("temperature read failed", err))?;
    let voltage_mv = servo
        .vin_read()
        .map_err(|err| link_error("voltage read failed", err))?;
    let mode = servo
        .mode_read()
        .map_err(|err| link_error("mode read failed", err))?;

    let out = StatusOutput {
        id: servo.id(),
        position,
        temperature_c,
        voltage_mv,
        mode: match mode.mode {
            DriveMode::Servo => "servo",
            DriveMode::Motor => "motor",
        },
        speed: mode.speed,
    };
    print_record(
        format,
        &out,
        &[
            ("id", out.id.to_string()),
            ("position", out.position.to_string()),
            ("temperature_c", out.temperature_c.to_string()),
            ("voltage_mv", out.voltage_mv.to_string()),
            ("mode", out.mode.to_string()),
            ("speed", out.speed.to_string()),
        ],
    );
    Ok(SUCCESS)
}
