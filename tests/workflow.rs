use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tempfile::tempdir;

use image_compressor_lib::bridge::{FsBridge, ScriptedDialogs, SelectionBridge};
use image_compressor_lib::core::{
    AppState, CompressionMode, CompressionOptions, ImageDescriptor, ItemStatus, ManualClock, OutputFormat,
    Page, SaveMode, SequentialIds,
};
use image_compressor_lib::processing::{BatchStage, SingleStage};
use image_compressor_lib::store::{HISTORY_KEY, JsonFileStore, KeyValueStore, MemoryStore};
use image_compressor_lib::utils::CompressorError;

const MB: u64 = 1024 * 1024;

fn origin() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T08:00:00Z").unwrap().with_timezone(&Utc)
}

fn shell<S: KeyValueStore>(store: S) -> (AppState<S>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(origin()));
    let state = AppState::load(store, clock.clone(), Arc::new(SequentialIds::new("img")), false);
    (state, clock)
}

fn image(name: &str, size: Option<u64>) -> ImageDescriptor {
    ImageDescriptor::new(format!("/src/{name}"), name, "data:image/jpeg;base64,/9j/4AAQ", size)
}

fn lossy(quality: u8) -> CompressionOptions {
    CompressionOptions { quality, mode: CompressionMode::Lossy, format: OutputFormat::Original }
}

fn run_batch<S: KeyValueStore>(state: &mut AppState<S>, clock: &ManualClock) {
    let batch = state.batch_mut().unwrap();
    batch.start().unwrap();
    while batch.stage() == BatchStage::Processing {
        clock.advance(Duration::from_millis(100));
        batch.tick().unwrap();
    }
}

#[tokio::test]
async fn three_image_batch_end_to_end() {
    let out = tempdir().unwrap();
    let (mut state, clock) = shell(MemoryStore::new());
    let page = state
        .pick_images(vec![image("a.jpg", Some(2 * MB)), image("b.jpg", Some(4 * MB)), image("c.jpg", Some(MB))])
        .unwrap();
    assert_eq!(page, Page::BatchProcess);
    state.batch_mut().unwrap().set_options(lossy(50)).unwrap();
    run_batch(&mut state, &clock);

    let batch = state.batch_mut().unwrap();
    let stats = batch.stats();
    assert_eq!(stats.total_original_label(), "7.00 MB");
    assert_eq!(stats.total_compressed_label(), "3.50 MB");
    assert_eq!(stats.compression_ratio, 50);

    let dialogs = ScriptedDialogs::new();
    dialogs.push_directory(Some(out.path())).push_directory(Some(out.path()));
    let bridge = FsBridge::new(dialogs);

    let first = batch.export_all(&bridge).await.unwrap().unwrap();
    let second = batch.export_all(&bridge).await.unwrap().unwrap();
    assert_eq!(first.saved, second.saved);
    assert!(first.failed.is_empty());
    for name in ["compressed_a.jpg", "compressed_b.jpg", "compressed_c.jpg"] {
        assert!(out.path().join(name).exists(), "{name} missing");
    }

    assert_eq!(state.finish_batch().unwrap(), 3);
    assert_eq!(state.page(), Page::Home);
    let history = state.history().entries();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].name, "a.jpg");
    assert_eq!(history[1].compressed_size, 2.0);
    assert_eq!(history[2].path, out.path().join("compressed_c.jpg").to_string_lossy());
    assert!(state.store().get(HISTORY_KEY).is_some());
}

#[test]
fn start_without_selection_is_rejected() {
    let (mut state, _) = shell(MemoryStore::new());
    state.pick_images(vec![image("a.jpg", None), image("b.jpg", None)]).unwrap();
    let batch = state.batch_mut().unwrap();
    batch.set_all_selected(false).unwrap();

    assert!(matches!(batch.start(), Err(CompressorError::NothingSelected)));
    assert_eq!(batch.stage(), BatchStage::Options);
    assert!(batch.items().iter().all(|i| i.status == ItemStatus::Pending && !i.selected));
}

#[test]
fn cancel_resets_every_item() {
    let (mut state, clock) = shell(MemoryStore::new());
    state
        .pick_images(vec![image("a.jpg", Some(MB)), image("b.jpg", None), image("c.jpg", Some(3 * MB))])
        .unwrap();
    let batch = state.batch_mut().unwrap();
    batch.toggle_selected(1).unwrap();
    batch.start().unwrap();
    for _ in 0..30 {
        clock.advance(Duration::from_millis(100));
        batch.tick().unwrap();
    }
    assert_eq!(batch.items()[0].status, ItemStatus::Completed);
    assert_eq!(batch.items()[1].status, ItemStatus::Skipped);
    assert_eq!(batch.items()[2].status, ItemStatus::Processing);

    batch.cancel().unwrap();
    for item in batch.items() {
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.compressed_size_label(), "-");
        assert_eq!(item.compression_ratio_label(), "-");
        assert!(item.thumbnail.is_none());
    }
    assert_eq!(batch.stage(), BatchStage::Options);
}

#[test]
fn items_are_processed_one_at_a_time_in_order() {
    let (mut state, clock) = shell(MemoryStore::new());
    let images = (0..5).map(|i| image(&format!("{i}.png"), Some(MB))).collect();
    state.pick_images(images).unwrap();
    let batch = state.batch_mut().unwrap();
    batch.toggle_selected(1).unwrap();
    batch.toggle_selected(3).unwrap();
    batch.start().unwrap();

    let mut order = Vec::new();
    while batch.stage() == BatchStage::Processing {
        let items = batch.items();
        let processing: Vec<usize> = (0..items.len()).filter(|&i| items[i].status == ItemStatus::Processing).collect();
        assert!(processing.len() <= 1);
        if let Some(&i) = processing.first() {
            if order.last() != Some(&i) {
                order.push(i);
            }
        }
        clock.advance(Duration::from_millis(100));
        batch.tick().unwrap();
    }
    assert_eq!(order, vec![0, 2, 4]);
}

#[tokio::test]
async fn batch_results_replace_earlier_single_entry() {
    let out = tempdir().unwrap();
    let (mut state, clock) = shell(MemoryStore::new());

    // single image saved into the export directory first
    state.pick_images(vec![image("a.jpg", Some(MB))]).unwrap();
    let single = state.single_mut().unwrap();
    single.start().unwrap();
    while single.stage() != SingleStage::Result {
        single.tick().unwrap();
    }
    let dialogs = ScriptedDialogs::new();
    dialogs.push_save(Some(out.path().join("compressed_a.jpg")));
    dialogs.push_directory(Some(out.path()));
    let bridge = FsBridge::new(dialogs);
    state.save_single(&bridge, SaveMode::SaveAs).await.unwrap().unwrap();
    state.pick_images(vec![image("z.jpg", None)]).unwrap();
    state.discard_single().unwrap();
    assert_eq!(state.history().len(), 1);

    // a batch exporting the same file name evicts it
    state.pick_images(vec![image("a.jpg", Some(MB)), image("b.jpg", Some(MB))]).unwrap();
    run_batch(&mut state, &clock);
    state.batch_mut().unwrap().export_all(&bridge).await.unwrap().unwrap();
    state.finish_batch().unwrap();

    let names: Vec<&str> = state.history().entries().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a.jpg", "b.jpg"]);
}

#[tokio::test]
async fn dropped_files_and_history_survive_restart() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("data").join("store.json");
    let photo = dir.path().join("photo.png");
    std::fs::write(&photo, [0x89, b'P', b'N', b'G', 0, 0]).unwrap();

    {
        let (mut state, _) = shell(JsonFileStore::open(&store_path));
        let dialogs = ScriptedDialogs::new();
        dialogs.push_save(Some(dir.path().join("photo_small.png")));
        let bridge = FsBridge::new(dialogs);

        let dropped = vec![photo.to_string_lossy().to_string(), "/missing/x.jpg".to_string()];
        assert_eq!(state.drop_files(&bridge, &dropped).await.unwrap(), Page::SingleProcess);

        let single = state.single_mut().unwrap();
        assert_eq!(single.image().size, Some(6));
        single.start().unwrap();
        while single.stage() != SingleStage::Result {
            single.tick().unwrap();
        }
        let saved = state.save_single(&bridge, SaveMode::Save).await.unwrap().unwrap();
        assert_eq!(std::fs::read(Path::new(&saved.path)).unwrap(), [0x89, b'P', b'N', b'G', 0, 0]);
    }

    let (state, _) = shell(JsonFileStore::open(&store_path));
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.history().entries()[0].name, "photo.png");
}

#[tokio::test]
async fn cancelled_pickers_change_nothing() {
    let (mut state, _) = shell(MemoryStore::new());
    let bridge = FsBridge::new(ScriptedDialogs::new());
    assert_eq!(state.upload(&bridge).await.unwrap(), Page::Home);
    assert!(bridge.select_directory().await.unwrap().is_none());
    assert!(state.store().is_empty());
}
