mod common;

use std::{sync::Arc, time::Duration};

use canvas_ledger::{
    codec::NibbleBitmap,
    config::{DatabaseConfig, TimelapseConfig},
    infrastructure::db::{
        Database,
        repositories::{ActivityRepository, StatisticsRepository, TimelapseRepository},
    },
    ledger::{BlockSource, StateReader, assets::TransactionPayload, block::StoreBlockSource},
    services::{
        consumer::EventConsumer, statistics::StatisticsRecorder,
        timelapse::TimelapseMaterializer,
    },
};

use common::*;

async fn database() -> Arc<Database> {
    let db = Database::init_db(&DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout: Duration::from_secs(5),
        idle_timeout: Duration::from_secs(3600),
    })
    .await
    .unwrap();
    db.run_migrations().await.unwrap();
    Arc::new(db)
}

fn blocks_for(harness: &Harness) -> Arc<dyn BlockSource> {
    Arc::new(StoreBlockSource::new(harness.store.clone()))
}

fn timelapses_for(harness: &Harness, db: Arc<Database>) -> TimelapseMaterializer {
    let reader: Arc<dyn StateReader> = harness.store.clone();
    TimelapseMaterializer::new(
        db,
        reader,
        blocks_for(harness),
        retry(),
        &TimelapseConfig {
            chunk_target: 3,
            preview_scale: 2,
        },
    )
}

/// Canvas 1 runs from block 1 to 10 with draws at blocks 2 and 5.
async fn draw_session(harness: &mut Harness) {
    let create = harness.transaction(
        ADMIN,
        TransactionPayload::CreateCanvas(create_canvas(1, 1, 10)),
    );
    harness.next_block(vec![create]).await;

    let alice = harness.transaction(ALICE, draw_pixels(1, &[0, 1], &[1, 2]));
    harness.next_block(vec![alice]).await;

    harness.advance_to(4).await;
    let bob = harness.transaction(BOB, draw_pixels(1, &[0], &[3]));
    harness.next_block(vec![bob]).await;

    harness.advance_to(10).await;
}

#[tokio::test]
async fn timelapse_follows_live_events_to_completion() {
    let db = database().await;
    let mut harness = Harness::new().await;
    let timelapses = timelapses_for(&harness, Arc::clone(&db));
    timelapses.initialise().await.unwrap();

    let mut receiver = harness.subscribe();
    draw_session(&mut harness).await;

    for event in drain(&mut receiver) {
        timelapses.handle(&event).await.unwrap();
    }

    let connection = db.get_connection();
    let summary = TimelapseRepository::find_summary_by_canvas(connection, 1)
        .await
        .unwrap()
        .unwrap();
    assert!(summary.completed);
    assert_eq!(summary.chunk_size, 3);
    assert!(timelapses.tracked_canvases().await.is_empty());

    let snapshots = TimelapseRepository::list_snapshots(connection, summary.id)
        .await
        .unwrap();
    let heights: Vec<i64> = snapshots.iter().map(|s| s.block_height).collect();
    assert_eq!(heights, vec![1, 4, 7, 10]);

    // Boundary snapshots are taken before the block's own draws.
    let at_four = NibbleBitmap::from_bytes(snapshots[1].snapshot.clone());
    assert_eq!((at_four.get(0), at_four.get(1)), (1, 2));
    let at_seven = NibbleBitmap::from_bytes(snapshots[2].snapshot.clone());
    assert_eq!((at_seven.get(0), at_seven.get(1)), (3, 2));

    let previews = TimelapseRepository::list_previews(connection, summary.id)
        .await
        .unwrap();
    assert_eq!(previews.len(), 4);
    let decoder = png::Decoder::new(std::io::Cursor::new(previews[0].preview.clone()));
    let reader = decoder.read_info().unwrap();
    assert_eq!((reader.info().width, reader.info().height), (20, 20));

    let blocks = ActivityRepository::list_blocks_by_canvas(connection, 1)
        .await
        .unwrap();
    let heights: Vec<i64> = blocks.iter().map(|b| b.block_height).collect();
    assert_eq!(heights, vec![2, 5]);

    let transactions = ActivityRepository::list_transactions_by_block(connection, blocks[0].id)
        .await
        .unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].block_index, 0);
}

#[tokio::test]
async fn timelapse_rebuilds_a_finished_canvas_once_on_startup() {
    let db = database().await;
    let mut harness = Harness::new().await;
    draw_session(&mut harness).await;

    let timelapses = timelapses_for(&harness, Arc::clone(&db));
    timelapses.initialise().await.unwrap();

    let connection = db.get_connection();
    let summary = TimelapseRepository::find_summary_by_canvas(connection, 1)
        .await
        .unwrap()
        .unwrap();
    assert!(summary.completed);
    assert_eq!(
        TimelapseRepository::list_snapshots(connection, summary.id)
            .await
            .unwrap()
            .len(),
        4
    );

    let restarted = timelapses_for(&harness, Arc::clone(&db));
    restarted.initialise().await.unwrap();
    assert!(restarted.tracked_canvases().await.is_empty());
    assert_eq!(
        TimelapseRepository::list_snapshots(connection, summary.id)
            .await
            .unwrap()
            .len(),
        4
    );
    assert_eq!(
        ActivityRepository::list_blocks_by_canvas(connection, 1)
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn statistics_catch_up_without_duplicates() {
    let db = database().await;
    let mut harness = Harness::new().await;
    draw_session(&mut harness).await;

    let recorder = StatisticsRecorder::new(Arc::clone(&db), blocks_for(&harness), retry());
    let next = recorder.catch_up().await.unwrap();
    assert_eq!(next, 11);

    let connection = db.get_connection();
    assert_eq!(StatisticsRepository::count_summaries(connection).await.unwrap(), 3);
    assert_eq!(
        StatisticsRepository::last_block_height(connection).await.unwrap(),
        Some(5)
    );

    recorder.catch_up().await.unwrap();
    assert_eq!(StatisticsRepository::count_summaries(connection).await.unwrap(), 3);

    let block = blocks_for(&harness).block_by_height(2).await.unwrap().unwrap();
    assert_eq!(recorder.record_block(&block).await.unwrap(), 0);
}

#[tokio::test]
async fn statistics_record_new_blocks_from_events() {
    let db = database().await;
    let mut harness = Harness::new().await;
    let recorder = StatisticsRecorder::new(Arc::clone(&db), blocks_for(&harness), retry());
    recorder.initialise().await.unwrap();

    let mut receiver = harness.subscribe();
    let create = harness.transaction(
        ADMIN,
        TransactionPayload::CreateCanvas(create_canvas(1, 1, 10)),
    );
    harness.next_block(vec![create]).await;

    for event in drain(&mut receiver) {
        recorder.handle(&event).await.unwrap();
    }

    assert_eq!(
        StatisticsRepository::count_summaries(db.get_connection())
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn replayed_boundary_keeps_one_preview_per_snapshot() {
    let db = database().await;
    let mut harness = Harness::new().await;
    draw_session(&mut harness).await;

    let timelapses = timelapses_for(&harness, Arc::clone(&db));
    timelapses.initialise().await.unwrap();

    let replaying = timelapses_for(&harness, Arc::clone(&db));
    replaying.initialise_timelapse(1).await.unwrap();
    let block = blocks_for(&harness).block_by_height(4).await.unwrap().unwrap();
    replaying.process_block(&block, Some(1)).await.unwrap();

    let connection = db.get_connection();
    let summary = TimelapseRepository::find_summary_by_canvas(connection, 1)
        .await
        .unwrap()
        .unwrap();
    let snapshot_heights: Vec<i64> = TimelapseRepository::list_snapshots(connection, summary.id)
        .await
        .unwrap()
        .iter()
        .map(|s| s.block_height)
        .collect();
    let preview_heights: Vec<i64> = TimelapseRepository::list_previews(connection, summary.id)
        .await
        .unwrap()
        .iter()
        .map(|p| p.block_height)
        .collect();
    assert_eq!(snapshot_heights, vec![1, 4, 7, 10]);
    assert_eq!(preview_heights, snapshot_heights);
}
