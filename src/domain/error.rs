//! Domain error types.
//!
//! Only the edges fail: loading price data, parsing config files and
//! writing output. The simulation core resolves degenerate input to
//! defined values instead.

/// Top-level error type for wfbacktest.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("failed to load price data from {source_name}: {reason}")]
    DataLoad { source_name: String, reason: String },

    #[error("malformed price data at row {row}: {reason}")]
    DataFormat { row: usize, reason: String },

    #[error("no price data in {source_name}")]
    EmptySeries { source_name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) => 1,
            BacktestError::ConfigParse { .. } => 2,
            BacktestError::DataLoad { .. }
            | BacktestError::DataFormat { .. }
            | BacktestError::EmptySeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
