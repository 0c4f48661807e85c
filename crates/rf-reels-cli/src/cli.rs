//! Command-line definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rf_reels::MachineProfile;

#[derive(Debug, Parser)]
#[command(name = "reelsim", version, about = "Headless three-reel cabinet simulator")]
pub struct Cli {
    /// Raise log level (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Play cabinet rounds with credits and bet
    Play(PlayArgs),
    /// Run many spins and report session statistics
    Batch(BatchArgs),
    /// Print the deceleration plan for a speed and offset
    Plan(PlanArgs),
    /// Print a cabinet configuration
    Config(ConfigArgs),
}

/// Where the cabinet configuration comes from
#[derive(Debug, Args)]
pub struct MachineArgs {
    /// JSON or YAML config file (overrides --profile)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Built-in preset
    #[arg(long, value_enum, default_value_t = ProfileArg::Classic)]
    pub profile: ProfileArg,
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub machine: MachineArgs,

    /// Rounds to play (stops early when credits run out)
    #[arg(long, default_value_t = 5)]
    pub spins: u64,

    /// RNG seed (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Starting credits
    #[arg(long, default_value_t = 10)]
    pub credits: u64,

    /// Bet per round
    #[arg(long, default_value_t = 1)]
    pub bet: u64,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub fps: u32,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    #[command(flatten)]
    pub machine: MachineArgs,

    #[arg(long, default_value_t = 10_000)]
    pub spins: u64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Stake per spin
    #[arg(long, default_value_t = 1)]
    pub stake: u64,

    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub fps: u32,

    /// Emit statistics as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub machine: MachineArgs,

    /// Speed at brake time (px/tick); defaults to the config's max speed
    #[arg(long)]
    pub speed: Option<f64>,

    /// Sub-cell offset at brake time (px)
    #[arg(long, default_value_t = 0.0)]
    pub offset: f64,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub machine: MachineArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileArg {
    Classic,
    Turbo,
}

impl From<ProfileArg> for MachineProfile {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Classic => MachineProfile::Classic,
            ProfileArg::Turbo => MachineProfile::Turbo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_batch() {
        let cli = Cli::parse_from(["reelsim", "-v", "batch", "--spins", "50", "--profile", "turbo", "--json"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Batch(args) => {
                assert_eq!(args.spins, 50);
                assert_eq!(args.seed, 42);
                assert_eq!(args.machine.profile, ProfileArg::Turbo);
                assert!(args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_fps_must_be_positive() {
        assert!(Cli::try_parse_from(["reelsim", "play", "--fps", "0"]).is_err());
    }
}
