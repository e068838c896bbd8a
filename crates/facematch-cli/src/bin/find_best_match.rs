use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use facematch_core::{find_best_match, BestMatchPayload, Envelope, DEFAULT_GALLERY_TOLERANCE};

const USAGE: &str = "Usage: find_best_match <probe_path> <candidate_path>... [--tolerance <tolerance>]";

#[derive(Parser)]
#[command(name = "find_best_match", version, about = "Find the closest stored embedding to a probe")]
struct Args {
    /// Probe embedding
    probe_path: PathBuf,
    /// Candidate embeddings, searched in order; put paths starting with '-' after `--`
    #[arg(required = true)]
    candidate_paths: Vec<PathBuf>,
    /// Maximum (exclusive) Euclidean distance for a match
    #[arg(
        long,
        default_value_t = DEFAULT_GALLERY_TOLERANCE,
        allow_negative_numbers = true,
        value_parser = facematch_cli::parse_tolerance
    )]
    tolerance: f64,
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
            return facematch_cli::emit(&Envelope::failed(USAGE, BestMatchPayload::empty()));
        }
    };

    let envelope = match find_best_match(&args.probe_path, &args.candidate_paths, args.tolerance) {
        Ok(search) => Envelope::ok(BestMatchPayload::found(search, args.tolerance)),
        Err(err) => {
            tracing::warn!(code = err.code(), error = %err, "gallery search failed");
            Envelope::failed(&err, BestMatchPayload::empty())
        }
    };

    facematch_cli::emit(&envelope)
}
