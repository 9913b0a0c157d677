//! Domain error types.

/// Top-level error type for chaindex.
#[derive(Debug, thiserror::Error)]
pub enum ChaindexError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("universe registry error: {reason}")]
    Universe { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no daily series for {symbol}")]
    NoData { symbol: String },

    #[error("benchmark series for {symbol} is unavailable; no backtest calendar can be built")]
    MissingBenchmark { symbol: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ChaindexError> for std::process::ExitCode {
    fn from(err: &ChaindexError) -> Self {
        let code: u8 = match err {
            ChaindexError::Io(_) | ChaindexError::Report { .. } => 1,
            ChaindexError::ConfigParse { .. }
            | ChaindexError::ConfigMissing { .. }
            | ChaindexError::ConfigInvalid { .. } => 2,
            ChaindexError::Data { .. } | ChaindexError::NoData { .. } => 3,
            ChaindexError::Universe { .. } => 4,
            ChaindexError::MissingBenchmark { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
