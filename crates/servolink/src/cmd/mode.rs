use serde::Serialize;
use servolink_servo::{DriveMode, LoadMode};
use tracing::info;

use crate::cmd::{LoadArgs, LoadState, ModeArgs};
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct ModeOutput {
    id: u8,
    mode: &'static str,
    speed: i16,
    updated: bool,
}

pub fn run_mode(args: ModeArgs, format: OutputFormat) -> CliResult<i32> {
    // Mode writes solicit no reply and may broadcast; only a read needs
    // a unicast id.
    if !args.servo && args.motor.is_none() {
        args.bus.require_unicast("mode")?;
    }
    let mut servo = args.bus.open()?;

    let out = if args.servo {
        servo
            .mode_write(DriveMode::Servo, 0)
            .map_err(|err| link_error("mode write failed", err))?;
        info!("switched to servo mode");
        ModeOutput {
            id: servo.id(),
            mode: "servo",
            speed: 0,
            updated: true,
        }
    } else if let Some(speed) = args.motor {
        servo
            .mode_write(DriveMode::Motor, speed)
            .map_err(|err| link_error("mode write failed", err))?;
        info!(speed, "switched to motor mode");
        ModeOutput {
            id: servo.id(),
            mode: "motor",
            speed: speed.clamp(-1000, 1000),
            updated: true,
        }
    } else {
        let status = servo
            .mode_read()
            .map_err(|err| link_error("mode read failed", err))?;
        ModeOutput {
            id: servo.id(),
            mode: match status.mode {
                DriveMode::Servo => "servo",
                DriveMode::Motor => "motor",
            },
            speed: status.speed,
            updated: false,
        }
    };

    print_record(
        format,
        &out,
        &[
            ("id", out.id.to_string()),
            ("mode", out.mode.to_string()),
            ("speed", out.speed.to_string()),
            ("updated", out.updated.to_string()),
        ],
    );
    Ok(SUCCESS)
}

#[derive(Serialize)]
struct LoadOutput {
    id: u8,
    state: &'static str,
    updated: bool,
}

pub fn run_load(args: LoadArgs, format: OutputFormat) -> CliResult<i32> {
    if args.state.is_none() {
        args.bus.require_unicast("load")?;
    }
    let mut servo = args.bus.open()?;

    let out = match args.state {
        Some(state) => {
            let mode = match state {
                LoadState::Hold => LoadMode::Load,
                LoadState::Free => LoadMode::Unload,
            };
            servo
                .load_write(mode)
                .map_err(|err| link_error("load write failed", err))?;
            info!(?mode, "load state set");
            LoadOutput {
                id: servo.id(),
                state: load_name(mode),
                updated: true,
            }
        }
        None => {
            let mode = servo
                .load_read()
                .map_err(|err| link_error("load read failed", err))?;
            LoadOutput {
                id: servo.id(),
                state: load_name(mode),
                updated: false,
            }
        }
    };

    print_record(
        format,
        &out,
        &[
            ("id", out.id.to_string()),
            ("state", out.state.to_string()),
            ("updated", out.updated.to_string()),
        ],
    );
    Ok(SUCCESS)
}

fn load_name(mode: LoadMode) -> &'static str {
    match mode {
        LoadMode::Load => "hold",
        LoadMode::Unload => "free",
    }
}
