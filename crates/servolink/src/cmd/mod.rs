use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use servolink_channel::SerialChannel;
use servolink_frame::BROADCAST_ADDRESS;
use servolink_servo::{BusServo, SessionConfig};

use crate::exit::{channel_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod commands;
pub mod id;
pub mod led;
pub mod limit;
pub mod mode;
pub mod motion;
pub mod status;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move a servo to a position.
    Move(MoveArgs),
    /// Start a staged move.
    Start(StartArgs),
    /// Stop the servo immediately.
    Stop(StopArgs),
    /// Read the current position.
    Position(PositionArgs),
    /// Read position, temperature, voltage and mode in one view.
    Status(StatusArgs),
    /// Read the servo id, or assign a new one with --set.
    Id(IdArgs),
    /// Read or set angle/voltage/temperature limits.
    Limit(LimitArgs),
    /// Read or set servo/motor drive mode.
    Mode(ModeArgs),
    /// Read or set whether the servo holds its position.
    Load(LoadArgs),
    /// Read or configure the power LED and its fault warnings.
    Led(LedArgs),
    /// List the command catalogue.
    Commands(CommandsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Move(args) => motion::run_move(args, format),
        Command::Start(args) => motion::run_start(args),
        Command::Stop(args) => motion::run_stop(args),
        Command::Position(args) => status::run_position(args, format),
        Command::Status(args) => status::run(args, format),
        Command::Id(args) => id::run(args, format),
        Command::Limit(args) => limit::run(args, format),
        Command::Mode(args) => mode::run_mode(args, format),
        Command::Load(args) => mode::run_load(args, format),
        Command::Led(args) => led::run(args, format),
        Command::Commands(args) => commands::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Arguments shared by every subcommand that touches the bus.
#[derive(Args, Debug)]
pub struct BusArgs {
    /// Serial device the servo bus hangs off (e.g. /dev/ttyAMA0).
    #[arg(long, short = 'p', env = "SERVOLINK_PORT")]
    pub port: String,

    /// Bus baud rate.
    #[arg(long, default_value_t = SerialChannel::DEFAULT_BAUD)]
    pub baud: u32,

    /// Servo id, 0-253 (254 = broadcast, write-only commands).
    #[arg(long, short = 'i', default_value_t = 1)]
    pub id: u8,

    /// Reply wait bound per exchange (e.g. 5ms, 1s).
    #[arg(long, default_value = "5ms")]
    pub timeout: String,
}

impl BusArgs {
    /// Reject the broadcast id for commands that wait on a reply.
    ///
    /// No servo answers a broadcast read, so letting one through would
    /// burn the reply timeout and surface as a bogus timeout failure.
    pub fn require_unicast(&self, action: &str) -> CliResult<()> {
        if self.id == BROADCAST_ADDRESS {
            return Err(CliError::new(
                USAGE,
                format!("{action} needs a unicast id; no servo answers a broadcast read"),
            ));
        }
        Ok(())
    }

    /// Open the serial channel and bind a servo handle to it.
    pub fn open(&self) -> CliResult<BusServo<SerialChannel>> {
        let reply_timeout = parse_duration(&self.timeout)?;
        let channel = SerialChannel::open_with_baud(&self.port, self.baud)
            .map_err(|err| channel_error("failed to open serial channel", err))?;
        Ok(BusServo::with_config(
            channel,
            self.id,
            SessionConfig { reply_timeout },
        ))
    }
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    #[command(flatten)]
    pub bus: BusArgs,
    /// Target position in 0.24-degree steps, clamped to 0..=1000.
    pub position: i16,
    /// Time to reach the target, in milliseconds (0 = full speed).
    #[arg(long, short = 't', default_value_t = 0)]
    pub time: u16,
    /// Stage the move instead of starting it; trigger with `start`.
    #[arg(long)]
    pub staged: bool,
}

#[derive(Args, Debug)]
pub struct StartArgs {
    #[command(flatten)]
    pub bus: BusArgs,
}

#[derive(Args, Debug)]
pub struct StopArgs {
    #[command(flatten)]
    pub bus: BusArgs,
}

#[derive(Args, Debug)]
pub struct PositionArgs {
    #[command(flatten)]
    pub bus: BusArgs,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub bus: BusArgs,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    #[command(flatten)]
    pub bus: BusArgs,
    /// Assign this id instead of reading the current one.
    #[arg(long, value_name = "NEW_ID")]
    pub set: Option<u8>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LimitSubject {
    /// Angle limits in 0.24-degree steps.
    Angle,
    /// Input-voltage limits in millivolts.
    Vin,
    /// Maximum temperature in degrees Celsius.
    Temp,
}

#[derive(Args, Debug)]
pub struct LimitArgs {
    #[command(flatten)]
    pub bus: BusArgs,
    /// Which limit to read or set.
    pub subject: LimitSubject,
    /// New lower bound (angle and vin only; requires --max).
    #[arg(long)]
    pub min: Option<i16>,
    /// New upper bound.
    #[arg(long)]
    pub max: Option<i16>,
}

#[derive(Args, Debug)]
pub struct ModeArgs {
    #[command(flatten)]
    pub bus: BusArgs,
    /// Switch to position-holding servo mode.
    #[arg(long, conflicts_with = "motor")]
    pub servo: bool,
    /// Switch to continuous-rotation motor mode at SPEED (-1000..=1000).
    #[arg(long, value_name = "SPEED", allow_hyphen_values = true)]
    pub motor: Option<i16>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LoadState {
    /// Apply torque to hold the commanded position.
    Hold,
    /// Let the shaft rotate freely.
    Free,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    #[command(flatten)]
    pub bus: BusArgs,
    /// New state; omit to read the current one.
    pub state: Option<LoadState>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LedState {
    On,
    Off,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AlarmKind {
    OverTemp,
    OverVolt,
    Stall,
}

#[derive(Args, Debug)]
pub struct LedArgs {
    #[command(flatten)]
    pub bus: BusArgs,
    /// New power LED state; omit to read the current configuration.
    pub state: Option<LedState>,
    /// Fault conditions the LED should warn about (comma-separated;
    /// pass an empty value to silence all warnings).
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    pub warn: Option<Vec<AlarmKind>>,
}

#[derive(Args, Debug, Default)]
pub struct CommandsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "ms")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

#[cfg(test)]
pub(crate) fn test_bus(id: u8) -> BusArgs {
    BusArgs {
        port: "/dev/null".to_string(),
        baud: SerialChannel::DEFAULT_BAUD,
        id,
        timeout: "5ms".to_string(),
    }
}
