//! CSV file adapters for per-asset daily series and the universe registry.
//!
//! Series live as one `SYMBOL.csv` per asset under a base directory with
//! `date,price,market_cap,volume` rows. The registry is a single CSV with
//! one asset per row.

use crate::domain::asset::{AssetCategory, AssetDefinition, Universe};
use crate::domain::error::ChaindexError;
use crate::domain::series::{DailyAssetSeries, DailyBar};
use crate::ports::series_port::SeriesPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvSeriesAdapter {
    base_path: PathBuf,
}

impl CsvSeriesAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize, name: &str) -> Result<&'r str, ChaindexError> {
    record.get(idx).ok_or_else(|| ChaindexError::Data {
        reason: format!("missing {name} column"),
    })
}

fn parse_f64(record: &StringRecord, idx: usize, name: &str) -> Result<f64, ChaindexError> {
    field(record, idx, name)?
        .trim()
        .parse()
        .map_err(|e| ChaindexError::Data {
            reason: format!("invalid {name} value: {e}"),
        })
}

impl SeriesPort for CsvSeriesAdapter {
    fn fetch_series(&self, symbol: &str) -> Result<DailyAssetSeries, ChaindexError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Err(ChaindexError::NoData {
                symbol: symbol.to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| ChaindexError::Data {
            reason: format!("failed to read {}: {e}", path.display()),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| ChaindexError::Data {
                reason: format!("CSV parse error in {}: {e}", path.display()),
            })?;

            let date = NaiveDate::parse_from_str(field(&record, 0, "date")?.trim(), "%Y-%m-%d")
                .map_err(|e| ChaindexError::Data {
                    reason: format!("invalid date in {}: {e}", path.display()),
                })?;

            bars.push(DailyBar {
                date,
                price: parse_f64(&record, 1, "price")?,
                market_cap: parse_f64(&record, 2, "market_cap")?,
                volume: parse_f64(&record, 3, "volume")?,
            });
        }

        Ok(DailyAssetSeries::new(symbol.to_string(), bars))
    }

    fn list_symbols(&self) -> Result<Vec<String>, ChaindexError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| ChaindexError::Data {
            reason: format!(
                "failed to read directory {}: {e}",
                self.base_path.display()
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ChaindexError::Data {
                reason: format!("directory entry error: {e}"),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ChaindexError> {
        let series = match self.fetch_series(symbol) {
            Ok(s) => s,
            Err(ChaindexError::NoData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => Ok(Some((first, last, series.len()))),
            _ => Ok(None),
        }
    }
}

fn universe_field<'r>(
    record: &'r StringRecord,
    idx: usize,
    name: &str,
) -> Result<&'r str, ChaindexError> {
    record.get(idx).ok_or_else(|| ChaindexError::Universe {
        reason: format!("missing {name} column"),
    })
}

fn parse_flag(value: &str, name: &str, symbol: &str) -> Result<bool, ChaindexError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(ChaindexError::Universe {
            reason: format!("invalid {name} flag for {symbol}: {other}"),
        }),
    }
}

/// Load the universe registry from a CSV with columns
/// `symbol,name,category,native,launched_or_nexus,primary_network,unresolved_audit`.
pub fn load_universe<P: AsRef<Path>>(path: P) -> Result<Universe, ChaindexError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ChaindexError::Universe {
        reason: format!("failed to read {}: {e}", path.display()),
    })?;

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut assets = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| ChaindexError::Universe {
            reason: format!("CSV parse error in {}: {e}", path.display()),
        })?;

        let symbol = universe_field(&record, 0, "symbol")?.trim().to_string();
        if symbol.is_empty() {
            return Err(ChaindexError::Universe {
                reason: format!("empty symbol in {}", path.display()),
            });
        }
        let category: AssetCategory = universe_field(&record, 2, "category")?
            .parse()
            .map_err(|reason| ChaindexError::Universe { reason })?;

        assets.push(AssetDefinition {
            name: universe_field(&record, 1, "name")?.trim().to_string(),
            category,
            is_native: parse_flag(universe_field(&record, 3, "native")?, "native", &symbol)?,
            launched_or_nexus: parse_flag(
                universe_field(&record, 4, "launched_or_nexus")?,
                "launched_or_nexus",
                &symbol,
            )?,
            primary_network: parse_flag(
                universe_field(&record, 5, "primary_network")?,
                "primary_network",
                &symbol,
            )?,
            unresolved_audit_finding: parse_flag(
                universe_field(&record, 6, "unresolved_audit")?,
                "unresolved_audit",
                &symbol,
            )?,
            symbol,
        });
    }

    Ok(Universe::new(assets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_series_dir() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("SOL.csv"),
            "date,price,market_cap,volume\n\
             2024-01-03,102.0,51000000000,900000000\n\
             2024-01-01,100.0,50000000000,800000000\n\
             2024-01-02,101.0,50500000000,850000000\n",
        )
        .unwrap();
        fs::write(
            path.join("RAY.csv"),
            "date,price,market_cap,volume\n2024-01-01,2.0,3000000000,5000000\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_series_parses_and_sorts() {
        let (_dir, path) = setup_series_dir();
        let adapter = CsvSeriesAdapter::new(path);

        let series = adapter.fetch_series("SOL").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(
            series.first_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert!((series.bars[2].price - 102.0).abs() < f64::EPSILON);
        assert!((series.bars[0].volume - 800_000_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fetch_series_missing_file_is_no_data() {
        let (_dir, path) = setup_series_dir();
        let adapter = CsvSeriesAdapter::new(path);
        let err = adapter.fetch_series("XYZ").unwrap_err();
        assert!(matches!(err, ChaindexError::NoData { symbol } if symbol == "XYZ"));
    }

    #[test]
    fn fetch_series_rejects_bad_rows() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD.csv"),
            "date,price,market_cap,volume\n2024-01-01,abc,1,1\n",
        )
        .unwrap();
        let adapter = CsvSeriesAdapter::new(dir.path().to_path_buf());
        assert!(matches!(
            adapter.fetch_series("BAD").unwrap_err(),
            ChaindexError::Data { .. }
        ));
    }

    #[test]
    fn list_symbols_returns_sorted_stems() {
        let (_dir, path) = setup_series_dir();
        let adapter = CsvSeriesAdapter::new(path);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["RAY", "SOL"]);
    }

    #[test]
    fn data_range_reports_bounds() {
        let (_dir, path) = setup_series_dir();
        let adapter = CsvSeriesAdapter::new(path);

        let (first, last, count) = adapter.get_data_range("SOL").unwrap().unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(count, 3);

        assert!(adapter.get_data_range("XYZ").unwrap().is_none());
    }

    #[test]
    fn load_universe_parses_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("universe.csv");
        fs::write(
            &path,
            "symbol,name,category,native,launched_or_nexus,primary_network,unresolved_audit\n\
             SOL,Solana,benchmark,true,true,true,false\n\
             RAY,Raydium,defi,yes,1,true,no\n\
             WETH,Wrapped Ether,defi,false,true,false,false\n",
        )
        .unwrap();

        let universe = load_universe(&path).unwrap();
        assert_eq!(universe.count(), 3);
        assert_eq!(universe.benchmark().unwrap().symbol, "SOL");
        let ray = universe.get("RAY").unwrap();
        assert!(ray.is_native && ray.launched_or_nexus && !ray.unresolved_audit_finding);
        assert!(!universe.get("WETH").unwrap().is_native);
    }

    #[test]
    fn load_universe_rejects_bad_category_and_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("universe.csv");

        fs::write(
            &path,
            "symbol,name,category,native,launched_or_nexus,primary_network,unresolved_audit\n\
             ABC,Abc,equity,true,true,true,false\n",
        )
        .unwrap();
        assert!(matches!(
            load_universe(&path).unwrap_err(),
            ChaindexError::Universe { .. }
        ));

        fs::write(
            &path,
            "symbol,name,category,native,launched_or_nexus,primary_network,unresolved_audit\n\
             ABC,Abc,defi,maybe,true,true,false\n",
        )
        .unwrap();
        assert!(matches!(
            load_universe(&path).unwrap_err(),
            ChaindexError::Universe { .. }
        ));
    }
}
