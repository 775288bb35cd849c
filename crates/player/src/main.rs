//! Oxide Animate - plays CSS transition and animation scenarios headlessly.

use std::time::Duration;

use animation::AnimationConfig;
use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use player::{run_realtime, run_simulated, RunReport, Scenario, ScenarioKind};

/// Oxide Animate - a headless CSS animation player
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario to play
    #[arg(long, value_enum, default_value_t = ScenarioKind::Fade)]
    scenario: ScenarioKind,

    /// Duration of one transition or iteration, in milliseconds
    #[arg(long, default_value = "1000")]
    duration_ms: u64,

    /// Frame interval, in milliseconds
    #[arg(long, default_value = "16")]
    frame_ms: u64,

    /// Animate every property in software
    #[arg(long)]
    software_only: bool,

    /// Follow the wall clock instead of a simulated one
    #[arg(long)]
    realtime: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn print_table(report: &RunReport) {
    println!("{:>8}  {:>8}  {:>8}  {:>10}", "time", "opacity", "left", "background");
    for frame in &report.frames {
        println!(
            "{:>8.3}  {:>8.3}  {:>8.2}  {:>10}",
            frame.time, frame.opacity, frame.left, frame.background
        );
    }
    for event in &report.events {
        println!(
            "{:>8.3}  {} {} (elapsed {:.3})",
            event.time, event.kind, event.name, event.elapsed_time
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.frame_ms == 0 {
        bail!("--frame-ms must be positive");
    }

    info!("Oxide Animate v{}", player::VERSION);

    let config = if args.software_only {
        AnimationConfig::software_only()
    } else {
        AnimationConfig::default()
    };
    let duration = Duration::from_millis(args.duration_ms);
    let frame = Duration::from_millis(args.frame_ms);
    let scenario = Scenario::build(args.scenario, duration)?;
    let limit = scenario.nominal_length(duration);
    info!(scenario = ?args.scenario, limit, realtime = args.realtime, "playing");

    let report = if args.realtime {
        run_realtime(scenario, config, frame, limit).await
    } else {
        run_simulated(scenario, config, frame, limit)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default() {
        let args = Args::parse_from(["oxide-animate"]);
        assert_eq!(args.scenario, ScenarioKind::Fade);
        assert_eq!(args.duration_ms, 1000);
        assert_eq!(args.frame_ms, 16);
        assert!(!args.realtime);
        assert!(!args.json);
    }

    #[test]
    fn test_args_with_scenario() {
        let args = Args::parse_from([
            "oxide-animate",
            "--scenario",
            "override",
            "--duration-ms",
            "250",
            "--software-only",
            "--json",
        ]);
        assert_eq!(args.scenario, ScenarioKind::Override);
        assert_eq!(args.duration_ms, 250);
        assert!(args.software_only);
        assert!(args.json);
    }

    #[test]
    fn test_args_rejects_unknown_scenario() {
        assert!(Args::try_parse_from(["oxide-animate", "--scenario", "spin"]).is_err());
    }
}
