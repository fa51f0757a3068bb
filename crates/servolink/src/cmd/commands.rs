use serde::Serialize;
use servolink_servo::COMMANDS;

use crate::cmd::CommandsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_listing, OutputFormat};

#[derive(Serialize)]
struct CommandRecord {
    id: u8,
    name: &'static str,
    request_payload: u8,
    reply_payload: Option<u8>,
}

pub fn run(_args: CommandsArgs, format: OutputFormat) -> CliResult<i32> {
    let records: Vec<CommandRecord> = COMMANDS
        .iter()
        .map(|spec| CommandRecord {
            id: spec.id,
            name: spec.name,
            request_payload: spec.request_payload,
            reply_payload: spec.reply_payload,
        })
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            vec![
                record.id.to_string(),
                record.name.to_string(),
                record.request_payload.to_string(),
                record
                    .reply_payload
                    .map_or_else(|| "-".to_string(), |len| len.to_string()),
            ]
        })
        .collect();

    print_listing(
        format,
        &records,
        &["ID", "COMMAND", "REQUEST", "REPLY"],
        rows,
    );
    Ok(SUCCESS)
}
