//! Export request and result types.

use crate::error::HarvestError;
use std::fmt;
use std::str::FromStr;

/// Wire format requested for the exported responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values, one response per row.
    #[default]
    Csv,

    /// The platform's native JSON export.
    Json,
}

impl ExportFormat {
    /// Returns the format name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(HarvestError::export(format!(
                "Unknown export format '{s}'. Expected 'csv' or 'json'"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one export run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Requested file format.
    pub format: ExportFormat,

    /// For csv exports, request numeric answer codes instead of labels.
    /// Ignored for json exports.
    pub numeric: bool,
}

/// A successfully created export job.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStarted {
    /// Token used to poll the job until it completes.
    pub progress_id: String,

    /// The full response body from the start call, kept for diagnostics.
    pub raw: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_as_str() {
        assert_eq!(ExportFormat::Csv.as_str(), "csv");
        assert_eq!(ExportFormat::Json.as_str(), "json");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(ExportFormat::Csv.to_string(), "csv");
        assert_eq!(ExportFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_options_default() {
        let options = ExportOptions::default();
        assert_eq!(options.format, ExportFormat::Csv);
        assert!(!options.numeric);
    }
}
