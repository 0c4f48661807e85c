//! reelsim: headless driver for the FluxForge reel kinematics engine

mod cabinet;
mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use rf_reels::{MachineConfig, SpinRng, WinKind, plan_deceleration, simulate};

use crate::cabinet::{Cabinet, MAX_BET};
use crate::cli::{BatchArgs, Cli, Command, ConfigArgs, MachineArgs, OutputFormat, PlanArgs, PlayArgs};

/// Frames allowed per round before giving up
const MAX_FRAMES_PER_ROUND: u64 = 100_000;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Play(args) => run_play(args),
        Command::Batch(args) => run_batch(args),
        Command::Plan(args) => run_plan(args),
        Command::Config(args) => run_config(args),
    }
}

fn load_config(args: &MachineArgs) -> Result<MachineConfig> {
    match &args.config {
        Some(path) => MachineConfig::load(path)
            .with_context(|| format!("loading cabinet config {}", path.display())),
        None => Ok(MachineConfig::from_profile(args.profile.into())),
    }
}

fn frame_duration(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps))
}

fn run_play(args: PlayArgs) -> Result<()> {
    let config = load_config(&args.machine)?;
    let seed = args.seed.unwrap_or_else(|| SpinRng::from_entropy().seed());
    let dt = frame_duration(args.fps);

    let mut cabinet = Cabinet::new(config, seed, args.credits).context("building cabinet")?;
    if args.bet > 1 {
        cabinet.adjust_bet(i64::try_from(args.bet - 1).context("bet out of range")?);
    }
    if cabinet.bet() != args.bet {
        log::warn!(
            "Bet {} outside 1..={}, playing {}",
            args.bet,
            MAX_BET.min(cabinet.credits()),
            cabinet.bet()
        );
    }
    log::info!(
        "Cabinet ready: seed {seed}, {} credits, bet {}",
        cabinet.credits(),
        cabinet.bet()
    );

    for round in 1..=args.spins {
        let start_tick = cabinet.machine().tick_count();
        match cabinet.play_round(dt, MAX_FRAMES_PER_ROUND) {
            Ok(outcome) => {
                let verdict = match outcome.kind {
                    WinKind::ThreeOfAKind => format!("WIN {} ({}x)", outcome.payout, outcome.multiplier),
                    WinKind::TwoOfAKind => format!("win {} ({}x)", outcome.payout, outcome.multiplier),
                    WinKind::NoWin => "no win".to_string(),
                };
                println!(
                    "#{round:<3} {}  {:<7} {:<7} {:<7}  {verdict:<16} credits {:>4}  ({} frames)",
                    cabinet.reel_line(),
                    outcome.symbols[0],
                    outcome.symbols[1],
                    outcome.symbols[2],
                    cabinet.credits(),
                    cabinet.machine().tick_count() - start_tick
                );
            }
            Err(err) => {
                println!("#{round:<3} {err}");
                break;
            }
        }
    }
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<()> {
    let config = load_config(&args.machine)?;
    let stats = simulate(config, args.seed, args.spins, args.stake, frame_duration(args.fps))
        .context("running batch simulation")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("spins            {}", stats.total_spins);
    println!("staked / paid    {} / {}", stats.total_stake, stats.total_payout);
    println!("RTP              {:.2}%", stats.rtp());
    println!("hit rate         {:.2}%", stats.hit_rate());
    println!("three / two      {} / {}", stats.three_of_a_kind, stats.two_of_a_kind);
    println!("fallback plans   {}", stats.fallback_plans);
    println!("ticks per spin   {:.1}", stats.mean_ticks_per_spin());
    println!("landings:");
    for (symbol, share) in stats.landing_share() {
        println!("  {:<8} {:>6.2}%", symbol.name(), share * 100.0);
    }
    Ok(())
}

fn run_plan(args: PlanArgs) -> Result<()> {
    let config = load_config(&args.machine)?;
    let h = config.reel.symbol_height;
    let speed = args.speed.unwrap_or(config.reel.max_speed);
    let min_speed = config.solver.min_brake_speed(h);
    if !(speed.is_finite() && speed >= min_speed) {
        anyhow::bail!("speed must be at least {min_speed:.4} px/tick, got {speed}");
    }
    if !(0.0..h).contains(&args.offset) {
        anyhow::bail!("offset must lie in [0, {h}), got {}", args.offset);
    }

    let plan = plan_deceleration(speed, args.offset, h, &config.solver);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn run_config(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args.machine)?;
    let text = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&config)?,
        OutputFormat::Yaml => serde_yml::to_string(&config)?,
    };
    println!("{text}");
    Ok(())
}
