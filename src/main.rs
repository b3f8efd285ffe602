// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, then hand over to `cli::run`.
// - Returns `anyhow::Result` so every fatal error ends up as one diagnostic.

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    paperless_uploader::cli::run()?;
    Ok(())
}
