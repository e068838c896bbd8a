//! Shared plumbing for the facematch command-line programs.

use std::io::{self, Write};
use std::process::ExitCode;

use facematch_core::Envelope;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

pub mod config;

pub use config::Config;

/// Install the fmt subscriber on stderr; stdout is reserved for the JSON response.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
}

/// Parse a tolerance argument; non-finite values would serialize as `null`.
pub fn parse_tolerance(value: &str) -> Result<f64, String> {
    let tolerance: f64 = value.parse().map_err(|e| format!("invalid tolerance '{value}': {e}"))?;
    if !tolerance.is_finite() {
        return Err(format!("tolerance must be a finite number, got '{value}'"));
    }
    Ok(tolerance)
}

/// Print the envelope as one JSON line and map it to the process exit code.
pub fn emit<P: Serialize>(envelope: &Envelope<P>) -> ExitCode {
    let written = serde_json::to_string(envelope).map_err(io::Error::from).and_then(|line| {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()
    });

    match written {
        Ok(()) if envelope.success => ExitCode::SUCCESS,
        Ok(()) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(error = %err, "failed to write response");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_accepts_finite_numbers() {
        assert_eq!(parse_tolerance("0.5"), Ok(0.5));
        assert_eq!(parse_tolerance("-0.1"), Ok(-0.1));
        assert_eq!(parse_tolerance("1"), Ok(1.0));
    }

    #[test]
    fn tolerance_rejects_non_finite_and_garbage() {
        for value in ["nan", "NaN", "inf", "-inf", "infinity", "1e400", "abc", ""] {
            assert!(parse_tolerance(value).is_err(), "{value} was accepted");
        }
    }
}
