use serde::Serialize;
use tracing::info;

use crate::cmd::{MoveArgs, StartArgs, StopArgs};
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct MoveOutput {
    id: u8,
    position: i16,
    time_ms: u16,
    staged: bool,
}

pub fn run_move(args: MoveArgs, format: OutputFormat) -> CliResult<i32> {
    let mut servo = args.bus.open()?;

    if args.staged {
        servo
            .move_time_wait_write(args.position, args.time)
            .map_err(|err| link_error("staged move failed", err))?;
    } else {
        servo
            .move_time_write(args.position, args.time)
            .map_err(|err| link_error("move failed", err))?;
    }

    info!(
        id = servo.id(),
        position = args.position,
        time_ms = args.time,
        staged = args.staged,
        "move command sent"
    );

    let out = MoveOutput {
        id: servo.id(),
        position: args.position,
        time_ms: args.time,
        staged: args.staged,
    };
    print_record(
        format,
        &out,
        &[
            ("id", out.id.to_string()),
            ("position", out.position.to_string()),
            ("time_ms", out.time_ms.to_string()),
            ("staged", out.staged.to_string()),
        ],
    );
    Ok(SUCCESS)
}

pub fn run_start(args: StartArgs) -> CliResult<i32> {
    let mut servo = args.bus.open()?;
    servo
        .move_start()
        .map_err(|err| link_error("start failed", err))?;
    info!(id = servo.id(), "staged move started");
    Ok(SUCCESS)
}

pub fn run_stop(args: StopArgs) -> CliResult<i32> {
    let mut servo = args.bus.open()?;
    servo
        .move_stop()
        .map_err(|err| link_error("stop failed", err))?;
    info!(id = servo.id(), "servo stopped");
    Ok(SUCCESS)
}
