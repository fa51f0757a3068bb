mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "servolink", version, about = "Serial-bus servo CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_move_subcommand() {
        let cli = Cli::try_parse_from([
            "servolink",
            "move",
            "--port",
            "/dev/ttyAMA0",
            "--id",
            "3",
            "500",
            "--time",
            "800",
        ])
        .expect("move args should parse");

        match cli.command {
            Command::Move(args) => {
                assert_eq!(args.bus.id, 3);
                assert_eq!(args.position, 500);
                assert_eq!(args.time, 800);
                assert!(!args.staged);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_mode_flags() {
        let err = Cli::try_parse_from([
            "servolink",
            "mode",
            "--port",
            "/dev/ttyAMA0",
            "--servo",
            "--motor",
            "200",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn motor_speed_accepts_negative_values() {
        let cli = Cli::try_parse_from([
            "servolink",
            "mode",
            "--port",
            "/dev/ttyAMA0",
            "--motor",
            "-300",
        ])
        .expect("negative motor speed should parse");

        match cli.command {
            Command::Mode(args) => assert_eq!(args.motor, Some(-300)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_limit_subcommand() {
        let cli = Cli::try_parse_from([
            "servolink",
            "limit",
            "--port",
            "/dev/ttyAMA0",
            "vin",
            "--min",
            "6000",
            "--max",
            "9000",
        ])
        .expect("limit args should parse");

        match cli.command {
            Command::Limit(args) => {
                assert!(matches!(args.subject, cmd::LimitSubject::Vin));
                assert_eq!(args.min, Some(6000));
                assert_eq!(args.max, Some(9000));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn led_warn_list_parses_comma_separated() {
        let cli = Cli::try_parse_from([
            "servolink",
            "led",
            "--port",
            "/dev/ttyAMA0",
            "on",
            "--warn",
            "over-temp,stall",
        ])
        .expect("led args should parse");

        match cli.command {
            Command::Led(args) => {
                let warn = args.warn.expect("warn list present");
                assert_eq!(warn.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn commands_listing_needs_no_port() {
        let cli =
            Cli::try_parse_from(["servolink", "commands"]).expect("commands should parse alone");
        assert!(matches!(cli.command, Command::Commands(_)));
    }

    #[test]
    fn timeout_parser_handles_units() {
        use std::time::Duration;

        assert_eq!(
            cmd::parse_duration("5ms").expect("ms"),
            Duration::from_millis(5)
        );
        assert_eq!(cmd::parse_duration("2s").expect("s"), Duration::from_secs(2));
        assert_eq!(
            cmd::parse_duration("250").expect("bare"),
            Duration::from_millis(250)
        );
        assert!(cmd::parse_duration("0ms").is_err());
        assert!(cmd::parse_duration("fast").is_err());
    }
}
