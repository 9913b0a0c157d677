//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{load_universe, CsvSeriesAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::asset::Universe;
use crate::domain::backtest::{
    run_backtest, BacktestConfig, BacktestResult, BacktestWindow, DateRange, RebalanceCadence,
};
use crate::domain::config_validation::validate;
use crate::domain::error::ChaindexError;
use crate::domain::series::DailyAssetSeries;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;
use crate::ports::series_port::SeriesPort;

#[derive(Parser, Debug)]
#[command(name = "chaindex", about = "Crypto index construction and backtesting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the JSON report
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Series directory; overrides [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long, default_value = "result.json")]
        output: PathBuf,
    },
    /// Validate a strategy configuration and its universe file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available data range per symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// List symbols with series files in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            output,
        } => run_backtest_cmd(&config, data.as_deref(), &output),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ChaindexError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Assemble a [`BacktestConfig`] from the `[backtest]` and `[weights]`
/// sections. Missing keys fall back to defaults; malformed values are
/// config errors.
pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, ChaindexError> {
    let cadence: RebalanceCadence = config
        .get_string("backtest", "cadence")
        .unwrap_or_else(|| "monthly".to_string())
        .parse()
        .map_err(|reason| invalid("cadence", reason))?;

    let num_assets = config.get_int("backtest", "num_assets", 5);
    let num_assets = usize::try_from(num_assets)
        .map_err(|_| invalid("num_assets", "must not be negative".to_string()))?;

    let max_weight = config.get_double("backtest", "max_weight", 0.4);
    let min_weight = config.get_double("backtest", "min_weight", 0.0);

    let start = config.get_string("backtest", "start_date");
    let end = config.get_string("backtest", "end_date");
    let range = match (start, end) {
        (Some(start), Some(end)) => DateRange::Explicit {
            start: parse_date("start_date", &start)?,
            end: parse_date("end_date", &end)?,
        },
        (Some(_), None) => return Err(missing("end_date")),
        (None, Some(_)) => return Err(missing("start_date")),
        (None, None) => {
            let window: BacktestWindow = config
                .get_string("backtest", "window")
                .unwrap_or_else(|| "all".to_string())
                .parse()
                .map_err(|reason| invalid("window", reason))?;
            DateRange::Trailing(window)
        }
    };

    // INI keys come back lowercased; symbols are stored uppercase.
    let fixed_weights = match config.get_section("weights") {
        Some(section) => {
            let mut weights = BTreeMap::new();
            for (symbol, value) in &section {
                let weight: f64 = value.parse().map_err(|e| ChaindexError::ConfigInvalid {
                    section: "weights".to_string(),
                    key: symbol.clone(),
                    reason: format!("not a number: {e}"),
                })?;
                weights.insert(symbol.to_uppercase(), weight);
            }
            Some(weights)
        }
        None => None,
    };

    let config = BacktestConfig {
        cadence,
        num_assets,
        max_weight,
        min_weight,
        range,
        fixed_weights,
    };
    validate(&config)?;
    Ok(config)
}

fn invalid(key: &str, reason: String) -> ChaindexError {
    ChaindexError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason,
    }
}

fn missing(key: &str) -> ChaindexError {
    ChaindexError::ConfigMissing {
        section: "backtest".to_string(),
        key: key.to_string(),
    }
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate, ChaindexError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| invalid(key, format!("expected YYYY-MM-DD: {e}")))
}

fn data_dir(config: &dyn ConfigPort, cli_override: Option<&Path>) -> PathBuf {
    match cli_override {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(
            config
                .get_string("data", "path")
                .unwrap_or_else(|| "./data".to_string()),
        ),
    }
}

fn universe_path(config: &dyn ConfigPort, data_dir: &Path) -> PathBuf {
    match config.get_string("data", "universe") {
        Some(path) => PathBuf::from(path),
        None => data_dir.join("universe.csv"),
    }
}

/// Fetch a series for every registry symbol. Assets with no data are
/// warned about and left out; the engine screens them out downstream.
fn load_series(
    port: &dyn SeriesPort,
    universe: &Universe,
) -> Result<BTreeMap<String, DailyAssetSeries>, ChaindexError> {
    let mut map = BTreeMap::new();
    for asset in universe.assets() {
        match port.fetch_series(&asset.symbol) {
            Ok(series) => {
                map.insert(asset.symbol.clone(), series);
            }
            Err(ChaindexError::NoData { symbol }) => {
                eprintln!("warning: no series file for {symbol}, asset will screen out");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(map)
}

fn run_backtest_cmd(config_path: &Path, data_override: Option<&Path>, output: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_dir = data_dir(&adapter, data_override);
    let universe_path = universe_path(&adapter, &data_dir);

    eprintln!("Loading universe from {}", universe_path.display());
    let universe = match load_universe(&universe_path) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Universe: {} assets", universe.count());

    let series_port = CsvSeriesAdapter::new(data_dir);
    let series_map = match load_series(&series_port, &universe) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Running backtest...");
    let result = match run_backtest(&bt_config, &universe, &series_map) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_summary(&result);

    if let Err(e) = JsonReportAdapter.write(&result, &output.display().to_string()) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("Report written to {}", output.display());
    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult) {
    let days = result.index.dates.len();
    eprintln!(
        "Simulated {days} days, {} rebalances, {} constituents",
        result.rebalances.len(),
        result.constituents.len()
    );
    eprintln!(
        "Index:     return {:+.2}%  vol {:.2}%  sharpe {:.2}  max dd {:.2}%",
        result.index.stats.cumulative_return * 100.0,
        result.index.stats.annualized_volatility * 100.0,
        result.index.stats.sharpe_ratio,
        result.index.stats.max_drawdown * 100.0
    );
    eprintln!(
        "Benchmark: return {:+.2}%  vol {:.2}%  sharpe {:.2}  max dd {:.2}%",
        result.benchmark.stats.cumulative_return * 100.0,
        result.benchmark.stats.annualized_volatility * 100.0,
        result.benchmark.stats.sharpe_ratio,
        result.benchmark.stats.max_drawdown * 100.0
    );
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_dir = data_dir(&adapter, None);
    let universe_path = universe_path(&adapter, &data_dir);
    let universe = match load_universe(&universe_path) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if universe.benchmark().is_none() {
        let e = ChaindexError::Universe {
            reason: "registry has no benchmark entry".to_string(),
        };
        eprintln!("error: {e}");
        return (&e).into();
    }

    println!(
        "configuration OK: {:?} cadence, {} constituents, {} universe assets",
        bt_config.cadence,
        bt_config.num_assets,
        universe.count()
    );
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path, symbol: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let data_dir = data_dir(&adapter, None);
    let port = CsvSeriesAdapter::new(data_dir);

    let symbols = match symbol {
        Some(s) => vec![s.to_string()],
        None => match port.list_symbols() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };

    for symbol in &symbols {
        match port.get_data_range(symbol) {
            Ok(Some((first, last, count))) => {
                println!("{symbol}: {first} to {last} ({count} bars)");
            }
            Ok(None) => println!("{symbol}: no data"),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let port = CsvSeriesAdapter::new(data_dir(&adapter, None));
    match port.list_symbols() {
        Ok(symbols) => {
            for symbol in symbols {
                println!("{symbol}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config = build_backtest_config(&adapter("[backtest]\n")).unwrap();
        assert_eq!(config.cadence, RebalanceCadence::Monthly);
        assert_eq!(config.num_assets, 5);
        assert_eq!(config.max_weight, 0.4);
        assert_eq!(config.range, DateRange::Trailing(BacktestWindow::Full));
        assert!(config.fixed_weights.is_none());
    }

    #[test]
    fn full_config_parses() {
        let config = build_backtest_config(&adapter(
            "[backtest]\ncadence = weekly\nnum_assets = 3\nmax_weight = 0.5\nwindow = 6m\n",
        ))
        .unwrap();
        assert_eq!(config.cadence, RebalanceCadence::Weekly);
        assert_eq!(config.num_assets, 3);
        assert_eq!(
            config.range,
            DateRange::Trailing(BacktestWindow::SixMonths)
        );
    }

    #[test]
    fn explicit_dates_beat_window() {
        let config = build_backtest_config(&adapter(
            "[backtest]\nstart_date = 2024-01-01\nend_date = 2024-06-01\nwindow = 1m\n",
        ))
        .unwrap();
        assert_eq!(
            config.range,
            DateRange::Explicit {
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            }
        );
    }

    #[test]
    fn lone_start_date_is_missing_key() {
        let err =
            build_backtest_config(&adapter("[backtest]\nstart_date = 2024-01-01\n")).unwrap_err();
        assert!(matches!(
            err,
            ChaindexError::ConfigMissing { key, .. } if key == "end_date"
        ));
    }

    #[test]
    fn bad_cadence_is_invalid() {
        let err = build_backtest_config(&adapter("[backtest]\ncadence = daily\n")).unwrap_err();
        assert!(matches!(
            err,
            ChaindexError::ConfigInvalid { key, .. } if key == "cadence"
        ));
    }

    #[test]
    fn bad_date_format_is_invalid() {
        let err = build_backtest_config(&adapter(
            "[backtest]\nstart_date = 01/01/2024\nend_date = 2024-06-01\n",
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            ChaindexError::ConfigInvalid { key, .. } if key == "start_date"
        ));
    }

    #[test]
    fn weights_section_becomes_fixed_weights() {
        let config = build_backtest_config(&adapter(
            "[backtest]\n[weights]\nSOL = 0.5\nray = 0.3\nJTO = 0.2\n",
        ))
        .unwrap();
        let weights = config.fixed_weights.unwrap();
        assert_eq!(weights.len(), 3);
        // Symbols are uppercased regardless of INI casing.
        assert_eq!(weights["RAY"], 0.3);
    }

    #[test]
    fn weights_failing_validation_are_rejected() {
        let err = build_backtest_config(&adapter("[backtest]\n[weights]\nSOL = 0.5\n"))
            .unwrap_err();
        assert!(matches!(err, ChaindexError::ConfigInvalid { .. }));
    }

    #[test]
    fn non_numeric_weight_is_invalid() {
        let err = build_backtest_config(&adapter("[backtest]\n[weights]\nSOL = lots\n"))
            .unwrap_err();
        assert!(matches!(
            err,
            ChaindexError::ConfigInvalid { section, .. } if section == "weights"
        ));
    }
}
