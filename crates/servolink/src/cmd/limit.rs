use serde::Serialize;
use tracing::info;

use crate::cmd::{LimitArgs, LimitSubject};
use crate::exit::{link_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct LimitOutput {
    id: u8,
    subject: &'static str,
    min: Option<i16>,
    max: i16,
    updated: bool,
}

pub fn run(args: LimitArgs, format: OutputFormat) -> CliResult<i32> {
    // Every path reads the limits back, so broadcast can never answer.
    args.bus.require_unicast("limit")?;
    let mut servo = args.bus.open()?;

    let out = match args.subject {
        LimitSubject::Angle => match (args.min, args.max) {
            (Some(min), Some(max)) => {
                servo
                    .angle_limit_write(min, max)
                    .map_err(|err| link_error("angle limit write failed", err))?;
                info!(min, max, "angle limits set");
                read_angle(&mut servo, true)?
            }
            (None, None) => read_angle(&mut servo, false)?,
            _ => {
                return Err(CliError::new(
                    USAGE,
                    "angle limits need both --min and --max",
                ))
            }
        },
        LimitSubject::Vin => match (args.min, args.max) {
            (Some(min), Some(max)) => {
                servo
                    .vin_limit_write(min, max)
                    .map_err(|err| link_error("voltage limit write failed", err))?;
                info!(min, max, "voltage limits set");
                read_vin(&mut servo, true)?
            }
            (None, None) => read_vin(&mut servo, false)?,
            _ => {
                return Err(CliError::new(
                    USAGE,
                    "voltage limits need both --min and --max",
                ))
            }
        },
        LimitSubject::Temp => {
            if args.min.is_some() {
                return Err(CliError::new(
                    USAGE,
                    "the temperature limit has no lower bound",
                ));
            }
            match args.max {
                Some(max) => {
                    let max = u8::try_from(max).map_err(|_| {
                        CliError::new(USAGE, "temperature limit must fit 0..=255 degrees")
                    })?;
                    servo
                        .temp_max_limit_write(max)
                        .map_err(|err| link_error("temperature limit write failed", err))?;
                    info!(max, "temperature limit set");
                    read_temp(&mut servo, true)?
                }
                None => read_temp(&mut servo, false)?,
            }
        }
    };

    let mut fields = vec![
        ("id", out.id.to_string()),
        ("subject", out.subject.to_string()),
    ];
    if let Some(min) = out.min {
        fields.push(("min", min.to_string()));
    }
    fields.push(("max", out.max.to_string()));
    fields.push(("updated", out.updated.to_string()));

    print_record(format, &out, &fields);
    Ok(SUCCESS)
}

fn read_angle(
    servo: &mut servolink_servo::BusServo<servolink_channel::SerialChannel>,
    updated: bool,
) -> CliResult<LimitOutput> {
    let limits = servo
        .angle_limit_read()
        .map_err(|err| link_error("angle limit read failed", err))?;
    Ok(LimitOutput {
        id: servo.id(),
        subject: "angle",
        min: Some(limits.min),
        max: limits.max,
        updated,
    })
}

fn read_vin(
    servo: &mut servolink_servo::BusServo<servolink_channel::SerialChannel>,
    updated: bool,
) -> CliResult<LimitOutput> {
    let limits = servo
        .vin_limit_read()
        .map_err(|err| link_error("voltage limit read failed", err))?;
    Ok(LimitOutput {
        id: servo.id(),
        subject: "vin",
        min: Some(limits.min),
        max: limits.max,
        updated,
    })
}

fn read_temp(
    servo: &mut servolink_servo::BusServo<servolink_channel::SerialChannel>,
    updated: bool,
) -> CliResult<LimitOutput> {
    let max = servo
        .temp_max_limit_read()
        .map_err(|err| link_error("temperature limit read failed", err))?;
    Ok(LimitOutput {
        id: servo.id(),
        subject: "temp",
        min: None,
        max: i16::from(max),
        updated,
    })
}
