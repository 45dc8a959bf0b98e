use std::fs::File;
use std::io::{BufWriter, Write};
use std::process;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use log::info;

use ptk_huim::cli::Arguments;
use ptk_huim::engine::{run_mining, MiningConfig, ParallelMode};
use ptk_huim::error::ConfigError;
use ptk_huim::loader::{load_profits, load_transactions};

fn mine(args: &Arguments) -> Result<()> {
    if args.k <= 0 {
        bail!(ConfigError::NonPositiveK(args.k));
    }

    info!("loading transactions from {}", args.database);
    let start = Instant::now();
    let (database, tx_diagnostics) = load_transactions(&args.database)?;
    let (profits, profit_diagnostics) = load_profits(&args.profits)?;
    info!(
        "loaded {} transactions and {} profit entries in {:?} ({} transaction tokens and {} profit lines skipped)",
        database.len(),
        profits.len(),
        start.elapsed(),
        tx_diagnostics.skipped_transaction_tokens,
        profit_diagnostics.skipped_profit_lines,
    );

    if !args.no_parallel {
        // Sized to the hardware thread count rather than relying on rayon's
        // global pool default silently matching it.
        let _ = rayon::ThreadPoolBuilder::new().num_threads(num_cpus::get()).build_global();
    }

    let config = MiningConfig {
        k: args.k as usize,
        min_prob: args.min_prob,
        strategy: args.strategy.into(),
        join_variant: args.join.into(),
        collector_kind: args.collector.into(),
        parallel: if args.no_parallel { ParallelMode::Sequential } else { ParallelMode::Parallel },
    };

    let outcome = run_mining(&database, &profits, &config)?;
    info!(
        "mined {} patterns (preprocess {:?}, rank {:?}, build {:?}, mine {:?})",
        outcome.patterns.len(),
        outcome.report.preprocessing_time,
        outcome.report.ranking_time,
        outcome.report.building_time,
        outcome.report.mining_time,
    );

    let write_patterns = |out: &mut dyn Write| -> Result<()> {
        writeln!(out, "items,expected_utility,existential_probability")?;
        for pattern in &outcome.patterns {
            let items: Vec<String> = pattern.items.iter().map(u32::to_string).collect();
            writeln!(
                out,
                "\"{}\",{},{}",
                items.join(" "),
                pattern.expected_utility,
                pattern.existential_probability
            )?;
        }
        Ok(())
    };

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            write_patterns(&mut out)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            write_patterns(&mut out)?;
        }
    }

    Ok(())
}

fn main() {
    let args = Arguments::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    if let Err(err) = mine(&args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
