use serde::Serialize;
use tracing::info;

use crate::cmd::IdArgs;
use crate::exit::{link_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct IdOutput {
    id: u8,
    assigned: bool,
}

pub fn run(args: IdArgs, format: OutputFormat) -> CliResult<i32> {
    let mut servo = args.bus.open()?;

    let out = match args.set {
        Some(new_id) => {
            if new_id > 253 {
                return Err(CliError::new(USAGE, "servo ids range from 0 to 253"));
            }
            servo
                .id_write(new_id)
                .map_err(|err| link_error("id assignment failed", err))?;
            info!(new_id, "servo id assigned");
            IdOutput {
                id: new_id,
                assigned: true,
            }
        }
        None => {
            // Discovery broadcasts, so this only works with a single servo
            // on the wire.
            let id = servo
                .id_read()
                .map_err(|err| link_error("id read failed", err))?;
            IdOutput {
                id,
                assigned: false,
            }
        }
    };

    print_record(
        format,
        &out,
        &[
            ("id", out.id.to_string()),
            ("assigned", out.assigned.to_string()),
        ],
    );
    Ok(SUCCESS)
}
