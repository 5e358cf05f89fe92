//! Property tests for the write-if-changed cache.
//!
//! These run the real `SyncWriter` against the in-memory filesystem and check
//! that, whatever was on disk before, one call converges on the desired
//! content and any further call is a no-op.

use std::path::Path;
use std::sync::Arc;

use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

use legacy_bridge::cache::digest::hash_bytes;
use legacy_bridge::cache::hash_store::HashStore;
use legacy_bridge::cache::{MemoryFileSystem, SyncOutcome, SyncWriter};

const DEST: &str = "/cache/legacy-bridge/legacy-cli";

fn content() -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..256)
}

proptest! {
    /// One call reaches the desired state; a second call writes nothing.
    #[test]
    fn ensure_converges(desired in content(), existing in option::of(content())) {
        let dest = Path::new(DEST);
        let fs = MemoryFileSystem::new();
        if let Some(bytes) = &existing {
            fs.insert_file(dest, bytes.clone());
        }
        let writer = SyncWriter::new(Arc::new(fs.clone()));
        let hash = hash_bytes(&desired);

        let first = writer.ensure(dest, &desired, &hash).unwrap();
        let expected = if existing.as_ref() == Some(&desired) {
            SyncOutcome::Current
        } else {
            SyncOutcome::Written
        };
        prop_assert_eq!(first, expected);
        prop_assert_eq!(fs.contents(dest), Some(desired.clone()));

        let writes = fs.total_writes();
        let second = writer.ensure(dest, &desired, &hash).unwrap();
        prop_assert_eq!(second, SyncOutcome::Current);
        prop_assert_eq!(fs.total_writes(), writes);
    }

    /// A change costs exactly one content write and leaves a matching sidecar.
    #[test]
    fn change_writes_once_with_sidecar(desired in content(), existing in content()) {
        prop_assume!(desired != existing);
        let dest = Path::new(DEST);
        let fs = MemoryFileSystem::new();
        fs.insert_file(dest, existing);
        let writer = SyncWriter::new(Arc::new(fs.clone()));
        let hash = hash_bytes(&desired);

        for _ in 0..3 {
            writer.ensure(dest, &desired, &hash).unwrap();
        }

        prop_assert_eq!(fs.write_count(dest), 1);
        let store = HashStore::new(Arc::new(fs.clone()));
        prop_assert_eq!(store.read_trusted_hash(dest), Some(hash));
    }

    /// Truncating the deployed file is always repaired on the next call.
    #[test]
    fn truncation_is_repaired(desired in vec(any::<u8>(), 1..256), keep in 0usize..256) {
        let dest = Path::new(DEST);
        let fs = MemoryFileSystem::new();
        let writer = SyncWriter::new(Arc::new(fs.clone()));
        let hash = hash_bytes(&desired);
        writer.ensure(dest, &desired, &hash).unwrap();

        let keep = keep % desired.len();
        fs.insert_file(dest, desired[..keep].to_vec());

        prop_assert_eq!(writer.ensure(dest, &desired, &hash).unwrap(), SyncOutcome::Written);
        prop_assert_eq!(fs.contents(dest), Some(desired));
    }
}
