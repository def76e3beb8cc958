use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};

use termvid::audio::AudioBackend;
use termvid::cli::Cli;
use termvid::player::{self, StopReason};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The filter has to be decided before the logger is built; raising the
    // global max level afterwards would not get past env_logger's own filter.
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    debug!("debug logging enabled");

    let opts = cli.resolve()?;

    if !opts.input.exists() {
        eprintln!("Error: video file '{}' not found.", opts.input.display());
        std::process::exit(1);
    }

    // One capability check at startup; the driver never probes again.
    let backend = if opts.audio {
        let backend = AudioBackend::probe();
        if backend.is_none() {
            warn!("audio output unavailable, playing video only");
        }
        backend
    } else {
        None
    };

    let summary = player::play(&opts, backend.as_ref()).await?;
    match summary.reason {
        StopReason::Exhausted => info!("played {} frames to the end", summary.frames_shown),
        StopReason::Interrupted => info!("interrupted after {} frames", summary.frames_shown),
    }
    Ok(())
}
