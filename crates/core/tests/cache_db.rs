use inspector_core::db::{payload_digest, CacheDb, StoreError, CURRENT_SCHEMA_VERSION};
use inspector_core::model::{Block, DisassemblyResponse, FunctionOverview, FunctionSummary, Link};
use tempfile::tempdir;

fn sample_response() -> DisassemblyResponse {
    DisassemblyResponse {
        blocks: vec![Block::new(0).with_function("f()"), Block::new(1)],
        links: vec![Link::not_taken(0, 1)],
        functions: vec![FunctionOverview::new(FunctionSummary::new("f()")).with_entrypoint(0)],
        coverage: serde_json::json!({ "covered": 2 }),
    }
}

#[test]
fn cache_initializes_schema_and_round_trips_payload() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("cache.db");

    {
        let db = CacheDb::open(&db_path).expect("open db");
        let version: i32 = db
            .connection()
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .expect("schema version");
        assert_eq!(version, CURRENT_SCHEMA_VERSION);

        let entry = db
            .put_disassembly("0xABCDEF", &sample_response(), Some("fixtures/abc.json"))
            .expect("put");
        assert_eq!(entry.address, "0xabcdef");
        assert_eq!(entry.block_count, 2);
        assert_eq!(entry.function_count, 1);
        assert_eq!(entry.digest.len(), 64);
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.stored_at).is_ok());
    }

    // Re-open sees existing schema and data.
    {
        let db = CacheDb::open(&db_path).expect("re-open db");
        let cached = db.get_disassembly("0xabcdef").expect("get").expect("cached");
        assert_eq!(cached.response, sample_response());
        assert_eq!(cached.entry.source.as_deref(), Some("fixtures/abc.json"));

        let payload = serde_json::to_string(&sample_response()).expect("serialize");
        assert_eq!(cached.entry.digest, payload_digest(payload.as_bytes()));
    }
}

#[test]
fn put_replaces_existing_entry() {
    let db = CacheDb::open_in_memory().expect("open db");
    db.put_disassembly("0x01", &sample_response(), None).expect("first put");

    let mut smaller = sample_response();
    smaller.blocks.truncate(1);
    smaller.links.clear();
    db.put_disassembly("0x01", &smaller, None).expect("second put");

    let entries = db.list_entries().expect("list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].block_count, 1);
    let cached = db.get_disassembly("0x01").expect("get").expect("cached");
    assert_eq!(cached.response.blocks.len(), 1);
}

#[test]
fn list_and_remove_entries() {
    let db = CacheDb::open_in_memory().expect("open db");
    db.put_disassembly("0xbb", &sample_response(), None).expect("put bb");
    db.put_disassembly("0xaa", &sample_response(), None).expect("put aa");

    let addresses: Vec<String> =
        db.list_entries().expect("list").into_iter().map(|e| e.address).collect();
    assert_eq!(addresses, vec!["0xaa", "0xbb"]);

    assert!(db.remove("0xAA").expect("remove"));
    assert!(!db.remove("0xaa").expect("remove again"));
    assert!(db.get_disassembly("0xaa").expect("get").is_none());
    assert_eq!(db.list_entries().expect("list").len(), 1);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("future.db");
    {
        let conn = rusqlite::Connection::open(&db_path).expect("raw open");
        conn.execute_batch("PRAGMA user_version = 99;").expect("bump version");
    }

    match CacheDb::open(&db_path) {
        Err(StoreError::UnsupportedSchemaVersion { found, max_supported, .. }) => {
            assert_eq!(found, 99);
            assert_eq!(max_supported, CURRENT_SCHEMA_VERSION);
        }
        other => panic!("expected UnsupportedSchemaVersion, got {other:?}"),
    }
}

#[test]
fn corrupt_payload_surfaces_json_error() {
    let db = CacheDb::open_in_memory().expect("open db");
    db.put_disassembly("0x01", &sample_response(), None).expect("put");
    db.connection()
        .execute("UPDATE disassemblies SET payload = 'not json' WHERE address = '0x01'", [])
        .expect("corrupt");

    assert!(matches!(db.get_disassembly("0x01"), Err(StoreError::Json(_))));
}
