//! Standalone track quality selection job
//!
//! Usage: `track_quality [CONFIG_FILE [TRACK_FILE [RESULTS_FILE]]]`
//!
//! The configuration defaults to `quality.cfg`, the track table to
//! `tracks.dat` and the results file to `quality.data`, all in the working
//! directory. Logging verbosity is controlled with `RUST_LOG`.

use eyre::WrapErr;

use track_quality::{
    config::Configuration, inference, ntuple, output, scheduling, ModeKind, Track,
};

use tracing_subscriber::EnvFilter;

use std::{env, path::PathBuf, time::Instant};

/// We'll use eyre's type-erased result type throughout the application
type Result<T> = eyre::Result<T>;

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    // ### LOGGING SETUP ###

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ### CONFIGURATION READOUT ###

    let mut args = env::args_os().skip(1).map(PathBuf::from);
    let config_path = args.next().unwrap_or_else(|| "quality.cfg".into());
    let tracks_path = args.next().unwrap_or_else(|| "tracks.dat".into());
    let results_path = args.next().unwrap_or_else(|| output::RESULTS_FILE.into());

    let cfg = Configuration::load(&config_path).wrap_err("Failed to load the configuration")?;
    if !cfg.enabled {
        tracing::warn!("Quality selection is disabled by the configuration, nothing to do");
        return Ok(());
    }

    // Learned models cannot be evaluated without an inference backend, so
    // better tell now than after reading all the tracks
    eyre::ensure!(
        cfg!(feature = "onnx") || cfg.selector.mode().kind() != ModeKind::LearnedModel,
        "Selector {} needs an inference runtime, please rebuild with the \"onnx\" feature",
        cfg.selector
    );

    let records = ntuple::load(&tracks_path).wrap_err("Failed to load the tracks")?;
    let tracks = records
        .iter()
        .map(|record| record.track.clone())
        .collect::<Vec<Track>>();

    // ### SELECTION ###

    // NOTE: The clock starts after file I/O, to avoid IO-induced timing
    //       fluctuations
    let saved_time = Instant::now();
    let runtime = inference::default_runtime();
    let decisions = scheduling::run_selection(&cfg.selector, &tracks, &*runtime)
        .wrap_err("Track selection failed")?;
    let elapsed_time = saved_time.elapsed();

    // ### RESULTS DISPLAY AND STORAGE ###

    let report = output::SelectionReport::new(&cfg, &records, &decisions);
    output::dump_results(&cfg, &report, elapsed_time, &results_path)
        .wrap_err("Failed to output the results")?;

    // ...and we're done
    Ok(())
}
