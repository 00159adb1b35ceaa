//! Round-trips through a real LMDB environment in a temp directory.

use interop_store::{KvStore, MetaStore, TypedStore};
use interop_store_lmdb::migration::CURRENT_SCHEMA_VERSION;
use interop_store_lmdb::{LmdbEnvironment, LmdbError};

fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
    let dir = tempfile::tempdir().expect("temp dir");
    let env = LmdbEnvironment::open(dir.path(), 4, 16 * 1024 * 1024).expect("open env");
    (dir, env)
}

#[test]
fn set_get_delete() {
    let (_dir, env) = temp_env();
    let kv = env.kv_store();

    kv.set(b"ballot/abc", b"payload").unwrap();
    assert_eq!(kv.get(b"ballot/abc").unwrap(), Some(b"payload".to_vec()));

    kv.delete(b"ballot/abc").unwrap();
    assert_eq!(kv.get(b"ballot/abc").unwrap(), None);
}

#[test]
fn deleting_missing_key_is_not_an_error() {
    let (_dir, env) = temp_env();
    assert!(env.kv_store().delete(b"never-written").is_ok());
}

#[test]
fn prefix_iteration_is_ordered_and_bounded() {
    let (_dir, env) = temp_env();
    let kv = env.kv_store();
    kv.set(b"list/\x00\x02", b"b").unwrap();
    kv.set(b"list/\x00\x01", b"a").unwrap();
    kv.set(b"lisu", b"outside").unwrap();
    kv.set(b"other/1", b"outside").unwrap();

    let entries = kv.iterate_prefix(b"list/").unwrap();
    let values: Vec<_> = entries.into_iter().map(|(_, v)| v).collect();
    assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec()]);
}

#[test]
fn typed_records_round_trip() {
    let (_dir, env) = temp_env();
    let kv = env.kv_store();
    kv.put_record(b"rec", &(42u64, "tss".to_string())).unwrap();
    let rec: Option<(u64, String)> = kv.get_record(b"rec").unwrap();
    assert_eq!(rec, Some((42, "tss".to_string())));
}

#[test]
fn fresh_environment_is_stamped_with_current_schema() {
    let (_dir, env) = temp_env();
    assert_eq!(env.kv_store().get_schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn reopening_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    {
        let env = LmdbEnvironment::open(dir.path(), 4, 16 * 1024 * 1024).unwrap();
        env.kv_store().set(b"k", b"v").unwrap();
    }
    let env = LmdbEnvironment::open(dir.path(), 4, 16 * 1024 * 1024).unwrap();
    assert_eq!(env.kv_store().get(b"k").unwrap(), Some(b"v".to_vec()));
}

#[test]
fn newer_schema_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    {
        let env = LmdbEnvironment::open(dir.path(), 4, 16 * 1024 * 1024).unwrap();
        env.kv_store()
            .set_schema_version(CURRENT_SCHEMA_VERSION + 1)
            .unwrap();
    }
    let result = LmdbEnvironment::open(dir.path(), 4, 16 * 1024 * 1024);
    assert!(matches!(result, Err(LmdbError::SchemaTooNew { .. })));
}

#[test]
fn write_batch_commits_in_one_transaction() {
    let (_dir, env) = temp_env();
    let kv = env.kv_store();
    kv.set(b"old", b"1").unwrap();

    let batch = interop_store::WriteBatch::new(kv.clone());
    batch.delete(b"old").unwrap();
    batch.set(b"new", b"2").unwrap();
    assert_eq!(kv.get(b"new").unwrap(), None);
    batch.commit().unwrap();

    assert_eq!(kv.get(b"old").unwrap(), None);
    assert_eq!(kv.get(b"new").unwrap(), Some(b"2".to_vec()));
}
