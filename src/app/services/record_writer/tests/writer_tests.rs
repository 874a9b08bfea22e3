//! Tests for per-file batching and cancellation through the store

use super::*;
use crate::app::services::chunk_store::{ChunkStore, PutMode, hash_station_id};
use crate::app::services::record_writer::structured_chunk;

fn kden() -> i32 {
    hash_station_id("KDEN")
}

fn stored_records(store: &MemoryChunkStore) -> Vec<ForecastRecord> {
    store
        .get_exact(STRUCTURED_URL, march(26, 12, 0), kden())
        .unwrap()
        .iter()
        .map(|c| serde_json::from_str(&c.data).unwrap())
        .collect()
}

fn raw_payloads(store: &MemoryChunkStore, valid: DateTime<Utc>) -> Vec<String> {
    store
        .get_exact(RAW_URL, valid, kden())
        .unwrap()
        .into_iter()
        .map(|c| c.data)
        .collect()
}

#[test]
fn test_records_written_on_flush() {
    let (store, mut writer) = create_test_writer(create_writer_config(CancelHandling::OverwriteOriginal));
    writer.add_record(&create_test_record(), None).unwrap();

    assert_eq!(writer.pending(), (1, 1));
    assert_eq!(store.chunk_count(RAW_URL), 0);

    writer.flush().unwrap();
    assert_eq!(writer.pending(), (0, 0));
    assert_eq!(store.chunk_count(RAW_URL), 1);
    assert_eq!(stored_records(&store), vec![create_test_record()]);
    assert_eq!(writer.stats().raw_chunks_written, 1);
    assert_eq!(writer.stats().structured_chunks_written, 1);
}

#[test]
fn test_disabled_sinks_write_nothing() {
    let mut config = create_writer_config(CancelHandling::OverwriteOriginal);
    config.store_raw_text = false;
    config.store_structured = false;
    let (store, mut writer) = create_test_writer(config);

    writer.add_record(&create_test_record(), None).unwrap();
    writer.flush().unwrap();
    assert_eq!(store.chunk_count(RAW_URL), 0);
    assert_eq!(store.chunk_count(STRUCTURED_URL), 0);
}

#[test]
fn test_cancel_overwrites_raw_original() {
    let (store, mut writer) = create_test_writer(create_writer_config(CancelHandling::OverwriteOriginal));
    writer.add_record(&create_test_record(), None).unwrap();
    writer.flush().unwrap();

    writer.add_record(&create_cancel_record(), None).unwrap();
    writer.flush().unwrap();

    assert_eq!(
        raw_payloads(&store, march(26, 12, 0)),
        vec![create_cancel_record().raw_text]
    );
}

#[test]
fn test_cancel_added_with_original_valid_time() {
    let (store, mut writer) =
        create_test_writer(create_writer_config(CancelHandling::AddWithOriginalValidTime));
    writer.add_record(&create_test_record(), None).unwrap();
    writer.flush().unwrap();

    // The cancellation arrives twice; only one copy is kept
    writer.add_record(&create_cancel_record(), None).unwrap();
    writer.add_record(&create_cancel_record(), None).unwrap();
    writer.flush().unwrap();

    assert_eq!(
        raw_payloads(&store, march(26, 12, 0)),
        vec![create_test_record().raw_text, create_cancel_record().raw_text]
    );
}

#[test]
fn test_cancel_added_at_issue_time() {
    let (store, mut writer) =
        create_test_writer(create_writer_config(CancelHandling::AddWithIssueTimeAsValidTime));
    writer.add_record(&create_test_record(), None).unwrap();
    writer.add_record(&create_cancel_record(), None).unwrap();
    writer.flush().unwrap();

    assert_eq!(
        raw_payloads(&store, march(26, 12, 0)),
        vec![create_test_record().raw_text]
    );
    assert_eq!(
        raw_payloads(&store, march(26, 14, 0)),
        vec![create_cancel_record().raw_text]
    );
}

#[test]
fn test_cancel_rewrites_stored_structured_record() {
    let (store, mut writer) = create_test_writer(create_writer_config(CancelHandling::OverwriteOriginal));
    writer.add_record(&create_test_record(), None).unwrap();
    writer.flush().unwrap();

    writer.add_record(&create_cancel_record(), None).unwrap();

    // Applied immediately, nothing new is queued for the structured store
    assert_eq!(writer.pending(), (1, 0));
    let records = stored_records(&store);
    assert_eq!(records.len(), 1);
    assert!(records[0].is_cancelled);
    assert_eq!(records[0].cancel_time, Some(march(26, 14, 0)));
    assert_eq!(records[0].issue_time, march(26, 11, 30));
    assert_eq!(writer.stats().records_cancelled, 1);
}

#[test]
fn test_cancel_applies_to_pending_record_in_same_file() {
    let (store, mut writer) = create_test_writer(create_writer_config(CancelHandling::OverwriteOriginal));
    writer.add_record(&create_test_record(), None).unwrap();
    writer.add_record(&create_cancel_record(), None).unwrap();
    writer.flush().unwrap();

    let records = stored_records(&store);
    assert_eq!(records.len(), 1);
    assert!(records[0].is_cancelled);
    assert_eq!(writer.stats().records_cancelled, 1);
    assert_eq!(writer.stats().cancel_targets_missing, 1);
}

#[test]
fn test_cancel_without_target_is_not_fatal() {
    let (store, mut writer) = create_test_writer(create_writer_config(CancelHandling::OverwriteOriginal));
    writer.add_record(&create_cancel_record(), None).unwrap();
    writer.flush().unwrap();

    assert!(stored_records(&store).is_empty());
    assert_eq!(writer.stats().cancel_targets_missing, 1);
    assert_eq!(writer.stats().records_cancelled, 0);
}

#[test]
fn test_cancel_reads_from_cancel_input_url() {
    let mut config = create_writer_config(CancelHandling::OverwriteOriginal);
    config.cancel_input_url = "spdb/taf/previous".to_string();
    let (store, mut writer) = create_test_writer(config);

    let original = structured_chunk(&create_test_record()).unwrap();
    store.put("spdb/taf/previous", &[original], PutMode::Add).unwrap();

    writer.add_record(&create_cancel_record(), None).unwrap();

    // Cancelled copy lands in the structured output store
    let records = stored_records(&store);
    assert_eq!(records.len(), 1);
    assert!(records[0].is_cancelled);
}

#[test]
fn test_already_cancelled_records_untouched() {
    let (store, mut writer) = create_test_writer(create_writer_config(CancelHandling::OverwriteOriginal));
    let mut earlier = create_test_record();
    earlier.cancel(march(26, 13, 0));
    store
        .put(STRUCTURED_URL, &[structured_chunk(&earlier).unwrap()], PutMode::Add)
        .unwrap();

    writer.add_record(&create_cancel_record(), None).unwrap();

    let records = stored_records(&store);
    assert_eq!(records[0].cancel_time, Some(march(26, 13, 0)));
    assert_eq!(writer.stats().records_cancelled, 0);
}
