//! Store persistence against the on-disk key/value backend:
//! fallback-and-heal on corrupt data, save/load round-trips, import rules.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use quotesync_core::{
    default_quotes, paths, store::QUOTES_KEY, CategoryFilter, FileKvStore, KeyValueStore,
    QuoteRecord, QuoteStore, SessionState,
};
use rstest::rstest;

fn kv_at(home: &assert_fs::TempDir) -> FileKvStore {
    FileKvStore::new(paths::store_dir(home.path()))
}

// ---------------------------------------------------------------------------
// 1. Load fallback
// ---------------------------------------------------------------------------

#[rstest]
#[case::not_json("not json")]
#[case::object(r#"{"text":"x","category":"y"}"#)]
#[case::string(r#""quotes""#)]
#[case::null("null")]
fn corrupt_storage_heals_to_defaults(#[case] raw: &str) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let kv = kv_at(&home);
    kv.set(QUOTES_KEY, raw).expect("seed corrupt value");

    let first = QuoteStore::load(kv.clone());
    assert_eq!(first.quotes(), default_quotes().as_slice());

    let second = QuoteStore::load(kv);
    assert_eq!(second.quotes(), default_quotes().as_slice());
}

#[test]
fn first_load_writes_quotes_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let _store = QuoteStore::load(kv_at(&home));

    home.child(".quotesync/store/quotes.json")
        .assert(predicate::path::exists());
    home.child(".quotesync/store/quotes.json")
        .assert(predicate::str::contains("Learning never exhausts the mind."));
}

// ---------------------------------------------------------------------------
// 2. Save / load round-trip
// ---------------------------------------------------------------------------

#[test]
fn save_then_load_preserves_order_and_values() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let list = vec![
        QuoteRecord::new("z", "Last"),
        QuoteRecord::new("a", "First"),
        QuoteRecord::new("Ünïcödé “quotes”", "Intl"),
    ];

    let mut store = QuoteStore::load(kv_at(&home));
    store.replace_all(list.clone()).expect("save");

    let reloaded = QuoteStore::load(kv_at(&home));
    assert_eq!(reloaded.quotes(), list.as_slice());
}

#[test]
fn append_survives_restart() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut store = QuoteStore::load(kv_at(&home));
    store
        .append(QuoteRecord::new("Ship it.", "Programming"))
        .expect("append");

    let reloaded = QuoteStore::load(kv_at(&home));
    assert_eq!(reloaded.len(), default_quotes().len() + 1);
    assert_eq!(
        reloaded.quotes().last(),
        Some(&QuoteRecord::new("Ship it.", "Programming"))
    );
}

// ---------------------------------------------------------------------------
// 3. Import
// ---------------------------------------------------------------------------

#[test]
fn partial_import_appends_valid_subset() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut store = QuoteStore::load(kv_at(&home));

    let added = store
        .import_json(r#"[{"text":"x","category":"y"}, {"bad":1}]"#)
        .expect("import");
    assert_eq!(added, 1);

    let reloaded = QuoteStore::load(kv_at(&home));
    assert_eq!(reloaded.quotes().last(), Some(&QuoteRecord::new("x", "y")));
}

#[test]
fn import_with_no_valid_records_is_rejected_entirely() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut store = QuoteStore::load(kv_at(&home));

    let err = store.import_json(r#"[{"bad":1}]"#).unwrap_err();
    assert!(err.to_string().contains("no valid quotes"), "got: {err}");

    let reloaded = QuoteStore::load(kv_at(&home));
    assert_eq!(reloaded.quotes(), default_quotes().as_slice());
}

// ---------------------------------------------------------------------------
// 4. Session state is separate from the quote list
// ---------------------------------------------------------------------------

#[test]
fn clearing_session_keeps_quotes() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let _store = QuoteStore::load(kv_at(&home));
    let session = SessionState::new(FileKvStore::new(paths::session_dir(home.path())));
    session
        .set_last_category(&CategoryFilter::Only("Motivation".into()))
        .expect("set");

    session.clear().expect("clear");

    assert_eq!(session.last_category(), None);
    home.child(".quotesync/store/quotes.json")
        .assert(predicate::path::exists());
}
