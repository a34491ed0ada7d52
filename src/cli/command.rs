use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = concat!(
        env!("CARGO_PKG_VERSION"),
        "\npiezolog ", env!("PIEZOLOG_VERSION"),
        "\nbuilt ", env!("BUILD_TIMESTAMP"),
    ),
    author       = env!("CARGO_PKG_AUTHORS"),
    about        = "Tools for inspecting and decoding piezo test platform capture logs",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// YAML file with capture format settings.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode the specified capture log into per-frame sample dumps.
    Decode(DecodeArgs),

    /// Print frame information
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Input capture log (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory for the dump files.
    #[arg(long, value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// Overwrite existing dump files.
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub mode: ModeArgs,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input capture log (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub mode: ModeArgs,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ModeArgs {
    /// Decode a single headerless frame instead of framed captures.
    #[arg(long)]
    pub legacy: bool,

    /// Sample width in bits for legacy captures.
    #[arg(long, value_name = "BITS")]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_arguments() {
        let cli = Cli::parse_from([
            "piezologd",
            "--strict",
            "decode",
            "capture.dat",
            "--legacy",
            "--width",
            "7",
            "--output-path",
            "out",
        ]);

        assert!(cli.strict);
        let Commands::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert!(args.mode.legacy);
        assert_eq!(args.mode.width, Some(7));
        assert_eq!(args.output_path, Some(PathBuf::from("out")));
        assert!(!args.force);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["piezologd", "info", "-", "--loglevel", "debug"]);

        assert!(matches!(cli.loglevel, LogLevel::Debug));
        assert!(matches!(cli.command, Commands::Info(_)));
    }
}
