// Headless entry point: compresses the images given on the command line and
// records them in the persisted history. The lib.rs file serves as the public API.

use std::path::PathBuf;
use anyhow::{Context, bail};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use image_compressor_lib::bridge::{FixedDirectoryDialogs, FsBridge};
use image_compressor_lib::core::{AppState, Page, SaveMode, SystemClock, UuidIds};
use image_compressor_lib::processing::drive;
use image_compressor_lib::store::JsonFileStore;
use image_compressor_lib::utils::format_seconds;

fn store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("image-compressor")
        .join("store.json")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false)
        .with_ansi(true)
        .with_writer(std::io::stdout)
        .compact()
        .init();

    info!("=== Image Compressor Starting ===");

    let mut args = std::env::args().skip(1);
    let Some(output_dir) = args.next() else {
        bail!("usage: image-compressor <output-dir> <image>...");
    };
    let inputs: Vec<String> = args.collect();
    if inputs.is_empty() {
        bail!("no input images given");
    }

    let store = JsonFileStore::open(store_path());
    let mut state = AppState::load(store, SystemClock::shared(), UuidIds::shared(), false);
    let bridge = FsBridge::new(FixedDirectoryDialogs::new(&output_dir));

    match state.drop_files(&bridge, &inputs).await? {
        Page::SingleProcess => {
            let session = state.single_mut().context("single session missing")?;
            session.start()?;
            drive(session, |p| {
                if p.current_progress % 25 == 0 {
                    info!("{}% ({}s left)", p.current_progress, p.time_remaining);
                }
            })
            .await?;

            match state.save_single(&bridge, SaveMode::SaveAs).await? {
                Some(result) => info!(
                    "Saved {} to {}: {:.2} MB -> {:.2} MB ({}%)",
                    result.name, result.path, result.original_size, result.compressed_size, result.compression_ratio
                ),
                None => warn!("Nothing saved"),
            }
        }
        Page::BatchProcess => {
            let session = state.batch_mut().context("batch session missing")?;
            session.start()?;
            let mut done = 0;
            drive(session, |p| {
                if p.completed_tasks > done {
                    done = p.completed_tasks;
                    info!(
                        "{}/{} done, {:.0}% total, {} left",
                        p.completed_tasks,
                        p.total_tasks,
                        p.progress_percentage,
                        format_seconds(p.time_remaining)
                    );
                }
            })
            .await?;

            let stats = session.stats();
            info!(
                "Batch: {} -> {} ({}) in {}",
                stats.total_original_label(),
                stats.total_compressed_label(),
                stats.compression_ratio_label(),
                stats.elapsed_label()
            );

            if let Some(report) = session.export_all(&bridge).await? {
                for failure in &report.failed {
                    warn!("{} not exported: {}", failure.name, failure.error);
                }
                info!("Exported {} files to {}", report.saved.len(), report.directory);
            }
            let recorded = state.finish_batch()?;
            info!("{} images added to history", recorded);
        }
        Page::Home | Page::Settings => {
            bail!("none of the given files could be read as images");
        }
    }

    info!("History holds {} entries", state.history().len());
    Ok(())
}
