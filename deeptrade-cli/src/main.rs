//! DeepTrade CLI: fetch bars, run the signal pipeline, print the call.
//!
//! Commands:
//! - `signal` — train on recent bars and print a trade call with its reasons
//! - `indicators` — print (or export as CSV) the indicator columns
//! - `levels` — print rolling and local-extrema support/resistance

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use deeptrade_core::data::{
    fetch_or_empty, CircuitBreaker, CsvSource, DataSource, Interval, SyntheticSource, YahooSource,
};
use deeptrade_core::domain::TradeCall;
use deeptrade_core::export::{analysis_to_json, write_series_csv};
use deeptrade_core::indicators::columns;
use deeptrade_core::levels::nearest_fibonacci;
use deeptrade_core::{Pipeline, PipelineConfig, Series};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "deeptrade",
    version,
    about = "DeepTrade: indicator, level and random-forest trade signals"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on recent bars and print a trade call.
    Signal {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the indicator columns for the latest bars.
    Indicators {
        #[command(flatten)]
        input: InputArgs,

        /// Write the full annotated series as CSV instead of printing.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Rows to print from the end of the series.
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// Print support and resistance levels.
    Levels {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceKind {
    Yahoo,
    Csv,
    Synthetic,
}

#[derive(Args)]
struct InputArgs {
    /// Where bars come from.
    #[arg(long, value_enum, default_value_t = SourceKind::Yahoo)]
    source: SourceKind,

    /// CSV file (required with --source csv).
    #[arg(long)]
    csv: Option<PathBuf>,

    /// TOML config file. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset symbol, e.g. BTC-USD.
    #[arg(long)]
    symbol: Option<String>,

    /// Bar interval: 1m, 5m, 15m, 1h, 4h, 1d.
    #[arg(long)]
    interval: Option<String>,

    /// Number of most recent bars.
    #[arg(long)]
    limit: Option<usize>,

    /// Model seed (also seeds synthetic bars).
    #[arg(long)]
    seed: Option<u64>,

    /// Print JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl InputArgs {
    fn config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(symbol) = &self.symbol {
            config.data.asset = symbol.clone();
        }
        if let Some(interval) = &self.interval {
            config.data.interval = interval.parse::<Interval>()?;
        }
        if let Some(limit) = self.limit {
            config.data.limit = limit;
        }
        if let Some(seed) = self.seed {
            config.model.seed = seed;
        }
        Ok(config)
    }

    fn source(&self, config: &PipelineConfig) -> Result<Box<dyn DataSource>> {
        Ok(match self.source {
            SourceKind::Yahoo => {
                let breaker = Arc::new(CircuitBreaker::default_provider());
                Box::new(YahooSource::new(breaker)?)
            }
            SourceKind::Csv => match &self.csv {
                Some(path) => Box::new(CsvSource::new(path)),
                None => bail!("--source csv requires --csv <path>"),
            },
            SourceKind::Synthetic => Box::new(SyntheticSource::new(config.model.seed)),
        })
    }

    /// Config plus the fetched bars. Fetch failures yield an empty series.
    fn load(&self) -> Result<(PipelineConfig, Series)> {
        let config = self.config()?;
        let source = self.source(&config)?;
        let d = &config.data;
        let bars = fetch_or_empty(source.as_ref(), &d.asset, d.interval, d.limit);
        info!(
            source = source.name(),
            asset = %d.asset,
            interval = %d.interval,
            bars = bars.len(),
            "bars loaded"
        );
        let series = Series::new(bars).context("source returned out-of-order bars")?;
        Ok((config, series))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deeptrade=info,deeptrade_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Signal { input } => run_signal(&input),
        Commands::Indicators { input, out, tail } => run_indicators(&input, out, tail),
        Commands::Levels { input } => run_levels(&input),
    }
}

fn fmt_price(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |p| format!("{p:.4}"))
}

fn run_signal(input: &InputArgs) -> Result<()> {
    let (config, series) = input.load()?;
    let asset = config.data.asset.clone();
    let analysis = Pipeline::new(config).analyze(series)?;

    if input.json {
        println!("{}", analysis_to_json(&analysis)?);
        return Ok(());
    }

    print_call(&asset, &analysis.call);
    if let Some(fib) = analysis.fib_entry {
        println!("Fib entry:   {fib:.4} (nearest Fibonacci level)");
    }
    if let Some(summary) = &analysis.model_summary {
        println!(
            "Model:       {} trees, seed {}, data {}, holdout accuracy {}",
            summary.fingerprint.n_trees,
            summary.fingerprint.seed,
            summary.fingerprint.dataset_hash,
            summary
                .holdout_accuracy
                .map_or_else(|| "-".to_string(), |a| format!("{:.1}%", a * 100.0)),
        );
    }
    if !analysis.explanation.is_empty() {
        println!();
        for line in &analysis.explanation {
            println!("  - {line}");
        }
    }
    Ok(())
}

fn print_call(asset: &str, call: &TradeCall) {
    println!("{asset}: {}", call.direction);
    if let Some(reason) = call.reason {
        println!("Reason:      {reason:?}");
    }
    if call.direction.is_actionable() {
        println!("Entry:       {}", fmt_price(call.entry));
        println!("Stop loss:   {}", fmt_price(call.stop_loss));
        println!("Take profit: {}", fmt_price(call.take_profit));
        if let Some(rr) = call.reward_risk() {
            println!("Reward/risk: {rr:.2}");
        }
    }
    if let Some(conf) = call.confidence {
        println!("Confidence:  {:.2}%", conf * 100.0);
    }
    for c in &call.corrections {
        println!("Corrected {:?} {:.4} -> {:.4}", c.kind, c.original, c.corrected);
    }
}

fn run_indicators(input: &InputArgs, out: Option<PathBuf>, tail: usize) -> Result<()> {
    let (config, series) = input.load()?;
    let series = Pipeline::new(config).annotate(series)?;

    if let Some(path) = out {
        write_series_csv(&series, &path).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {} rows to {}", series.len(), path.display());
        return Ok(());
    }
    if input.json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    let shown = [
        columns::SMA,
        columns::EMA_FAST,
        columns::EMA_SLOW,
        columns::MACD,
        columns::ATR,
        columns::VWAP,
        columns::BOLLINGER_UPPER,
        columns::BOLLINGER_LOWER,
    ];
    print!("{:<20} {:>12}", "time", "close");
    for name in shown {
        print!(" {name:>15}");
    }
    println!();

    let start = series.len().saturating_sub(tail);
    for (i, bar) in series.bars().iter().enumerate().skip(start) {
        print!("{:<20} {:>12.4}", bar.time.format("%Y-%m-%d %H:%M"), bar.close);
        for name in shown {
            print!(" {:>15}", fmt_price(series.value(name, i)));
        }
        println!();
    }
    Ok(())
}

fn run_levels(input: &InputArgs) -> Result<()> {
    let (config, series) = input.load()?;
    let pipeline = Pipeline::new(config);
    let (rolling, extrema) = pipeline.levels(&series);

    if input.json {
        let fib_entry = series
            .latest_close()
            .and_then(|price| nearest_fibonacci(price, &rolling));
        let value = serde_json::json!({
            "rolling": rolling,
            "extrema": extrema,
            "fib_entry": fib_entry,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let lc = &pipeline.config().levels;
    println!("Rolling ({} bars)", lc.rolling_window);
    println!("  support:    {}", fmt_price(rolling.support));
    println!("  resistance: {}", fmt_price(rolling.resistance));
    let fib = series
        .latest_close()
        .and_then(|price| nearest_fibonacci(price, &rolling));
    println!("  fib entry:  {}", fmt_price(fib));
    println!("Local extrema (window {})", lc.extrema_window);
    let list = |v: &[f64]| {
        if v.is_empty() {
            "-".to_string()
        } else {
            v.iter().map(|p| format!("{p:.4}")).collect::<Vec<_>>().join(", ")
        }
    };
    println!("  support:    {}", list(&extrema.support[..]));
    println!("  resistance: {}", list(&extrema.resistance[..]));
    Ok(())
}
