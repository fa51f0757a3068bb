use serde::Serialize;
use servolink_servo::{LedAlarms, PowerLed};
use tracing::info;

use crate::cmd::{AlarmKind, LedArgs, LedState};
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct LedOutput {
    id: u8,
    led: &'static str,
    warn_over_temp: bool,
    warn_over_volt: bool,
    warn_stall: bool,
    updated: bool,
}

pub fn run(args: LedArgs, format: OutputFormat) -> CliResult<i32> {
    // The configuration is always read back, so broadcast can never answer.
    args.bus.require_unicast("led")?;
    let mut servo = args.bus.open()?;
    let updating = args.state.is_some() || args.warn.is_some();

    if let Some(state) = args.state {
        let led = match state {
            LedState::On => PowerLed::On,
            LedState::Off => PowerLed::Off,
        };
        servo
            .led_ctrl_write(led)
            .map_err(|err| link_error("led write failed", err))?;
        info!(?led, "power led set");
    }

    if let Some(kinds) = &args.warn {
        let alarms = LedAlarms {
            over_temperature: kinds.contains(&AlarmKind::OverTemp),
            over_voltage: kinds.contains(&AlarmKind::OverVolt),
            stall: kinds.contains(&AlarmKind::Stall),
        };
        servo
            .led_error_write(alarms)
            .map_err(|err| link_error("led warning write failed", err))?;
        info!(bits = alarms.bits(), "led warnings set");
    }

    let led = servo
        .led_ctrl_read()
        .map_err(|err| link_error("led read failed", err))?;
    let alarms = servo
        .led_error_read()
        .map_err(|err| link_error("led warning read failed", err))?;

    let out = LedOutput {
        id: servo.id(),
        led: match led {
            PowerLed::On => "on",
            PowerLed::Off => "off",
        },
        warn_over_temp: alarms.over_temperature,
        warn_over_volt: alarms.over_voltage,
        warn_stall: alarms.stall,
        updated: updating,
    };
    print_record(
        format,
        &out,
        &[
            ("id", out.id.to_string()),
            ("led", out.led.to_string()),
            ("warn_over_temp", out.warn_over_temp.to_string()),
            ("warn_over_volt", out.warn_over_volt.to_string()),
            ("warn_stall", out.warn_stall.to_string()),
            ("updated", out.updated.to_string()),
        ],
    );
    Ok(SUCCESS)
}
