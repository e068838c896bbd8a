use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use facematch_cli::Config;
use facematch_core::{generate_embedding, EmbeddingPayload, Envelope, OnnxBackend};

const USAGE: &str = "Usage: generate_embedding <image_path>";

#[derive(Parser)]
#[command(name = "generate_embedding", version, about = "Generate a 128-d face embedding from an image")]
struct Args {
    /// Image containing the face to encode
    #[arg(allow_hyphen_values = true)]
    image_path: PathBuf,
}

fn main() -> ExitCode {
    facematch_cli::init_tracing();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if !err.use_stderr() => {
            // --help / --version
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            tracing::debug!(error = %err, "argument parsing failed");
            return facematch_cli::emit(&Envelope::failed(USAGE, EmbeddingPayload::empty()));
        }
    };

    let config = Config::from_env();
    let envelope = match generate_embedding(&args.image_path, || OnnxBackend::load(&config.model_paths())) {
        Ok(generated) => {
            tracing::info!(
                path = %args.image_path.display(),
                face_count = generated.face_count,
                "embedding generated"
            );
            Envelope::ok(EmbeddingPayload::from(generated))
        }
        Err(err) => {
            tracing::warn!(
                path = %args.image_path.display(),
                code = err.code(),
                error = %err,
                "embedding generation failed"
            );
            Envelope::failed(&err, EmbeddingPayload::empty())
        }
    };

    facematch_cli::emit(&envelope)
}
