use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use facematch_core::{compare_embedding_files, ComparisonPayload, Envelope, DEFAULT_TOLERANCE};

const USAGE: &str = "Usage: compare_faces <embedding1_path> <embedding2_path> [tolerance]";

#[derive(Parser)]
#[command(name = "compare_faces", version, about = "Compare two stored face embeddings")]
struct Args {
    /// First embedding (JSON array of 128 numbers)
    #[arg(allow_hyphen_values = true)]
    embedding1_path: PathBuf,
    /// Second embedding (JSON array of 128 numbers)
    #[arg(allow_hyphen_values = true)]
    embedding2_path: PathBuf,
    /// Match when the Euclidean distance is strictly below this value [default: 0.5]
    #[arg(allow_negative_numbers = true, value_parser = facematch_cli::parse_tolerance)]
    tolerance: Option<f64>,
}

fn main() -> ExitCode {
    facematch_cli::init_tracing();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            tracing::debug!(error = %err, "argument parsing failed");
            return facematch_cli::emit(&Envelope::failed(USAGE, ComparisonPayload::empty()));
        }
    };

    let tolerance = args.tolerance.unwrap_or(DEFAULT_TOLERANCE);
    let envelope = match compare_embedding_files(&args.embedding1_path, &args.embedding2_path, tolerance) {
        Ok(comparison) => Envelope::ok(ComparisonPayload::from(comparison)),
        Err(err) => {
            tracing::warn!(code = err.code(), error = %err, "comparison failed");
            Envelope::failed(&err, ComparisonPayload::empty())
        }
    };

    facematch_cli::emit(&envelope)
}
