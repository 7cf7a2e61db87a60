//! Integration tests for parsing, merging and persisting shards
//!
//! Covers:
//! - Map-mode round trip through the shard store
//! - Idempotent re-runs over the same rows
//! - Read-modify-write across runs and renew mode
//! - Array-mode rendering from persisted shards

use std::fs;
use tempfile::TempDir;
use yubin_common::serializer::{lookup_array, lookup_map, CALLBACK};
use yubin_common::{Diagnostics, Directory, RecordParser, ShardStore, SupplementaryTable};

fn row(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|s| s.to_string()).collect()
}

fn sapporo_rows() -> Vec<Vec<String>> {
    vec![
        row(&[
            "01101", "060  ", "0600042", "ホッカイドウ", "サッポロシチュウオウク",
            "オオドオリニシ（１−１９チョウメ）", "北海道", "札幌市中央区", "大通西（１〜３丁目）",
            "0", "0", "1", "0", "0", "0",
        ]),
        row(&[
            "01101", "060  ", "0600000", "ホッカイドウ", "サッポロシチュウオウク",
            "イカニケイサイガナイバアイ", "北海道", "札幌市中央区", "以下に掲載がない場合",
            "0", "0", "0", "0", "0", "0",
        ]),
        row(&[
            "01101", "ﾎｯｶｲﾄﾞｳﾁｮｳ", "北海道庁", "北海道", "札幌市中央区", "北三条西",
            "６丁目", "0608588", "060  ", "札幌中央", "0", "0", "0",
        ]),
    ]
}

fn build(rows: &[Vec<String>]) -> (Directory, Diagnostics) {
    let parser = RecordParser::default();
    let mut diag = Diagnostics::default();
    let groups: Vec<_> = rows
        .iter()
        .filter_map(|fields| parser.parse_fields(fields, &mut diag).ok())
        .collect();
    let dir = Directory::new("060").merge_all(groups, &mut diag);
    (dir, diag)
}

#[test]
fn test_map_mode_round_trip() {
    let tmp = TempDir::new().unwrap();
    let store = ShardStore::new(tmp.path());
    let (dir, _) = build(&sapporo_rows());

    let written = store.write(&dir, false, &mut Diagnostics::default()).unwrap();
    let reloaded = store.open("060").unwrap();

    assert_eq!(reloaded, written);
    assert_eq!(reloaded, dir);
    assert_eq!(reloaded.keys(), ["0600000", "0600042", "0608588"]);
    assert_eq!(reloaded.get("0600042").unwrap().addresses.len(), 3);
}

#[test]
fn test_rerun_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let store = ShardStore::new(tmp.path());
    let (dir, _) = build(&sapporo_rows());

    store.write(&dir, false, &mut Diagnostics::default()).unwrap();
    let first = fs::read(store.shard_path("060")).unwrap();
    store.write(&dir, false, &mut Diagnostics::default()).unwrap();
    let second = fs::read(store.shard_path("060")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_second_run_merges_with_persisted() {
    let tmp = TempDir::new().unwrap();
    let store = ShardStore::new(tmp.path());
    let rows = sapporo_rows();

    let (first, _) = build(&rows[..1]);
    store.write(&first, false, &mut Diagnostics::default()).unwrap();
    let (second, _) = build(&rows[1..]);
    let written = store.write(&second, false, &mut Diagnostics::default()).unwrap();

    assert_eq!(written.len(), 3);
    assert!(written.get("0600042").is_some());
    assert!(written.get("0608588").is_some());
}

#[test]
fn test_renew_discards_persisted() {
    let tmp = TempDir::new().unwrap();
    let store = ShardStore::new(tmp.path());
    let rows = sapporo_rows();

    let (first, _) = build(&rows[..1]);
    store.write(&first, false, &mut Diagnostics::default()).unwrap();
    let (second, _) = build(&rows[1..]);
    let written = store.write(&second, true, &mut Diagnostics::default()).unwrap();

    assert_eq!(written.len(), 2);
    assert!(written.get("0600042").is_none());
    assert_eq!(store.open("060").unwrap(), written);
}

#[test]
fn test_office_row_persisted_with_normalized_kana() {
    let tmp = TempDir::new().unwrap();
    let store = ShardStore::new(tmp.path());
    let (dir, diag) = build(&sapporo_rows());
    store.write(&dir, false, &mut Diagnostics::default()).unwrap();

    let bytes = fs::read(store.shard_path("060")).unwrap();
    let group = lookup_map(&bytes, "0608588").unwrap().unwrap();

    assert_eq!(group.addresses.len(), 1);
    assert_eq!(group.addresses[0].office_name, "北海道庁");
    assert_eq!(group.addresses[0].office_kana, "ホッカイドウチョウ");
    assert_eq!(group.addresses[0].address, "６丁目");
    assert_eq!(diag.rows_read, 3);
    assert_eq!(diag.rows_rejected, 0);
}

#[test]
fn test_script_rendered_from_persisted_shard() {
    let tmp = TempDir::new().unwrap();
    let store = ShardStore::new(tmp.path());
    let (dir, _) = build(&sapporo_rows());
    store.write(&dir, false, &mut Diagnostics::default()).unwrap();

    let path = store.write_script("060", &store).unwrap();
    let script = fs::read_to_string(&path).unwrap();
    assert!(script.starts_with("$yubin({\"0600000\":[1,"));
    assert!(script.ends_with("]]});"));

    let found = lookup_array(&script, "0600042", CALLBACK).unwrap().unwrap();
    let record = &found["0600042"];
    assert_eq!(record.prefecture_id, 1);
    assert_eq!(record.city, vec!["札幌市中央区"]);
    assert_eq!(record.town, vec!["大通西"]);
    assert_eq!(record.address, vec!["１丁目", "２丁目", "３丁目"]);
    assert_eq!(record.address_kana, vec!["１チョウメ", "２チョウメ", "３チョウメ"]);
}

#[test]
fn test_script_for_missing_shard_fails() {
    let tmp = TempDir::new().unwrap();
    let store = ShardStore::new(tmp.path());
    assert!(store.write_script("999", &store).is_err());
}

#[test]
fn test_later_run_fills_unresolved_kana() {
    let tmp = TempDir::new().unwrap();
    let store = ShardStore::new(tmp.path());
    let kyoto = row(&[
        "26101", "603  ", "6038000", "キョウトフ", "キョウトシキタク", "シンマチ",
        "京都府", "京都市北区", "新町（京町）", "0", "0", "0", "0", "0", "0",
    ]);

    let mut diag = Diagnostics::default();
    let group = RecordParser::default().parse_fields(&kyoto, &mut diag).unwrap();
    assert_eq!(diag.unresolved_kana, 1);
    store
        .write(&Directory::new("603").merge(group), false, &mut diag)
        .unwrap();

    let table = SupplementaryTable::from_entries([("京町".to_string(), "キョウマチ".to_string())]);
    let group = RecordParser::new(table).parse_fields(&kyoto, &mut diag).unwrap();
    let written = store
        .write(&Directory::new("603").merge(group), false, &mut diag)
        .unwrap();

    let addresses = &written.get("6038000").unwrap().addresses;
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].street, "京町");
    assert_eq!(addresses[0].street_kana, "キョウマチ");
    assert_eq!(store.open("603").unwrap(), written);
}
