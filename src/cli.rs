//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

use crate::adapters::csv_adapter::{CsvAdapter, CsvSeriesWriter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest;
use crate::domain::config::{EngineSettings, override_windows, resolve_settings};
use crate::domain::indicator::{TechnicalIndicators, bollinger, macd};
use crate::domain::metrics::Metrics;
use crate::domain::optimizer::GridOptimizer;
use crate::domain::price_point::PricePoint;
use crate::domain::strategy::Strategy;
use crate::domain::walk_forward::WalkForward;
use crate::ports::data_port::DataPort;
use crate::ports::indicator_port::IndicatorProvider;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "wfbacktest", about = "Signal backtester with grid and walk-forward search")]
pub struct Cli {
    /// Log candidate scores and fold decisions
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest a fixed SMA window
    Backtest {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        window: usize,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also annotate Bollinger bands and MACD in the output
        #[arg(long)]
        extras: bool,
    },
    /// Grid search over low/high volatility SMA windows
    Optimize {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, value_delimiter = ',')]
        low: Vec<usize>,
        #[arg(long, value_delimiter = ',')]
        high: Vec<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Walk-forward SMA window selection with chained equity
    WalkForward {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        train: Option<usize>,
        #[arg(long)]
        test: Option<usize>,
        #[arg(long, value_delimiter = ',')]
        windows: Vec<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the configuration after defaults are applied
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Installs the stderr log subscriber.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            data,
            window,
            config,
            output,
            extras,
        } => run_backtest(&data, window, config.as_ref(), output.as_ref(), extras),
        Command::Optimize {
            data,
            config,
            low,
            high,
            output,
        } => run_optimize(&data, config.as_ref(), low, high, output.as_ref()),
        Command::WalkForward {
            data,
            config,
            train,
            test,
            windows,
            output,
        } => run_walk_forward(&data, config.as_ref(), train, test, windows, output.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_settings(path: Option<&PathBuf>) -> Result<EngineSettings, ExitCode> {
    let Some(path) = path else {
        return Ok(EngineSettings::default());
    };
    eprintln!("Loading config from {}", path.display());
    match FileConfigAdapter::from_file(path) {
        Ok(adapter) => Ok(resolve_settings(&adapter)),
        Err(e) => {
            eprintln!("error: {e}");
            Err((&e).into())
        }
    }
}

pub fn load_series(path: &PathBuf) -> Result<Vec<PricePoint>, ExitCode> {
    let adapter = CsvAdapter::new(PathBuf::from("."));
    let source = path.to_string_lossy();
    match adapter.load_series(&source) {
        Ok(series) => {
            eprintln!("Loaded {} points from {}", series.len(), path.display());
            Ok(series)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Err((&e).into())
        }
    }
}

fn write_output(series: &[PricePoint], output: Option<&PathBuf>) -> ExitCode {
    let Some(path) = output else {
        return ExitCode::SUCCESS;
    };
    match CsvSeriesWriter.write_series(series, &path.to_string_lossy()) {
        Ok(()) => {
            eprintln!("\nSeries written to: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write series: {e}");
            (&e).into()
        }
    }
}

pub fn print_metrics(metrics: &Metrics) {
    eprintln!("Final Equity:     {:.4}", metrics.final_equity);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe);
}

fn run_backtest(
    data: &PathBuf,
    window: usize,
    config: Option<&PathBuf>,
    output: Option<&PathBuf>,
    extras: bool,
) -> ExitCode {
    let settings = match load_settings(config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let mut series = match load_series(data) {
        Ok(s) => s,
        Err(code) => return code,
    };

    eprintln!("Running SMA({}) backtest", window);
    TechnicalIndicators.annotate(&mut series, window);
    if extras {
        bollinger::add_bollinger_bands(
            &mut series,
            bollinger::DEFAULT_WINDOW,
            bollinger::DEFAULT_NUM_STD,
        );
        macd::add_macd(
            &mut series,
            macd::DEFAULT_FAST,
            macd::DEFAULT_SLOW,
            macd::DEFAULT_SIGNAL,
        );
    }
    Strategy::FixedWindow { window }.assign_positions(&mut series);
    backtest::simulate(&mut series, settings.backtest.start_equity);

    let metrics = Metrics::compute(&series, settings.backtest.annualization_factor);
    eprintln!("\n=== Results ===");
    print_metrics(&metrics);

    write_output(&series, output)
}

fn run_optimize(
    data: &PathBuf,
    config: Option<&PathBuf>,
    low: Vec<usize>,
    high: Vec<usize>,
    output: Option<&PathBuf>,
) -> ExitCode {
    let mut settings = match load_settings(config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    settings.low_windows = override_windows(&settings.low_windows, &low, "low");
    settings.high_windows = override_windows(&settings.high_windows, &high, "high");
    let series = match load_series(data) {
        Ok(s) => s,
        Err(code) => return code,
    };

    eprintln!(
        "Searching {} x {} regime window pairs",
        settings.low_windows.len(),
        settings.high_windows.len()
    );
    let indicators = TechnicalIndicators;
    let result = GridOptimizer::new(&indicators, &settings.regimes)
        .with_config(settings.backtest)
        .with_parallelism(settings.parallel)
        .optimize(&series, &settings.low_windows, &settings.high_windows);

    let metrics = Metrics::compute(&result.series, settings.backtest.annualization_factor);
    eprintln!("\n=== Grid Search ===");
    eprintln!("Low-vol window:   {}", result.best.low);
    eprintln!("High-vol window:  {}", result.best.high);
    eprintln!("Best Sharpe:      {:.2}", result.sharpe);
    eprintln!("\n=== Results ===");
    print_metrics(&metrics);

    write_output(&result.series, output)
}

fn run_walk_forward(
    data: &PathBuf,
    config: Option<&PathBuf>,
    train: Option<usize>,
    test: Option<usize>,
    windows: Vec<usize>,
    output: Option<&PathBuf>,
) -> ExitCode {
    let mut settings = match load_settings(config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    if let Some(train) = train {
        settings.walk_forward.train_size = train;
    }
    if let Some(test) = test {
        settings.walk_forward.test_size = test;
    }
    settings.walk_forward.windows =
        override_windows(&settings.walk_forward.windows, &windows, "windows");
    let series = match load_series(data) {
        Ok(s) => s,
        Err(code) => return code,
    };

    eprintln!(
        "Walk-forward: train {} / test {} over {} points",
        settings.walk_forward.train_size,
        settings.walk_forward.test_size,
        series.len()
    );
    let indicators = TechnicalIndicators;
    let result = WalkForward::new(&indicators)
        .with_config(settings.backtest)
        .with_parallelism(settings.parallel)
        .run(&series, settings.walk_forward.clone());

    if result.folds.is_empty() {
        eprintln!("warning: series too short for a single fold");
    }

    eprintln!("\n=== Folds ===");
    for fold in &result.folds {
        eprintln!(
            "  fold {}: SMA({}) in-sample Sharpe {:.2}, equity {:.4} -> {:.4}",
            fold.spec.fold_index, fold.window, fold.train_sharpe, fold.start_equity, fold.end_equity,
        );
    }
    eprintln!("\n=== Out-of-Sample Results ===");
    print_metrics(&result.metrics);

    write_output(&result.combined, output)
}

fn run_validate(config: &PathBuf) -> ExitCode {
    let settings = match load_settings(Some(config)) {
        Ok(s) => s,
        Err(code) => return code,
    };

    eprintln!("\n[backtest]");
    eprintln!("  start_equity:         {}", settings.backtest.start_equity);
    eprintln!("  annualization_factor: {}", settings.backtest.annualization_factor);
    eprintln!("[walk_forward]");
    eprintln!("  train_size:           {}", settings.walk_forward.train_size);
    eprintln!("  test_size:            {}", settings.walk_forward.test_size);
    eprintln!("  windows:              {:?}", settings.walk_forward.windows);
    eprintln!("[grid]");
    eprintln!("  low_windows:          {:?}", settings.low_windows);
    eprintln!("  high_windows:         {:?}", settings.high_windows);
    eprintln!("[regime]");
    eprintln!("  window:               {}", settings.regimes.window);
    eprintln!("  iterations:           {}", settings.regimes.iterations);
    eprintln!("[engine]");
    eprintln!("  parallel:             {}", settings.parallel);

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
