use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use log::info;
use multicore_scheduler::{
    config::SchedulerConfig,
    scheduler::{DisplayTerminal, PlainTable, ProcessRunner, DEFAULT_TICK_RATE},
};
use std::{io, path::PathBuf, time::Duration};

#[derive(Debug, Parser)]
#[command(version, about = "Simulates CPU scheduling on multiple cores")]
struct Cli {
    /// Configuration file describing cores, algorithm and processes
    config: PathBuf,

    /// Print a plain text table instead of the full-screen view
    #[arg(long)]
    plain: bool,

    /// Dispatcher tick in milliseconds
    #[arg(long, value_name = "MS")]
    tick_ms: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = SchedulerConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let tick_rate = match cli.tick_ms {
        Some(ms) if ms.is_finite() && ms > 0.0 => Duration::from_secs_f64(ms / 1000.0),
        Some(ms) => anyhow::bail!("invalid tick length: {ms} ms"),
        None => DEFAULT_TICK_RATE,
    };
    info!(
        "{} processes, {} cores, {}",
        config.processes.len(),
        config.cores,
        config.algorithm.name()
    );

    let runner = ProcessRunner::new(config).with_tick_rate(tick_rate);
    let report = if cli.plain {
        runner.run(&mut PlainTable::stdout())
    } else {
        let mut display = DisplayTerminal::new(runner.config().algorithm.name())?;
        let report = runner.run(&mut display);
        drop(display);
        execute!(io::stdout(), Clear(ClearType::All))?;
        report
    };

    println!("{report}");
    Ok(())
}
