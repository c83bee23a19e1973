//! Inspect command implementation.

use super::{print_json, CliError, CliResult, Session};
use kvrec_core::{CollectionHandle, Layout, Record};
use kvrec_storage::KvStore;
use serde::Serialize;

/// Database inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Database path.
    pub path: String,
    /// Per-collection details.
    pub collections: Vec<CollectionInfo>,
    /// Records skipped as unreadable while counting.
    pub skipped_records: u64,
    /// Blobs that were not JSON arrays.
    pub malformed_blobs: u64,
}

/// Details for a single collection.
#[derive(Debug, Serialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: &'static str,
    /// Storage layout.
    pub layout: Layout,
    /// Store keys owned by the collection.
    pub keys: usize,
    /// Readable records.
    pub records: usize,
}

/// Runs the inspect command.
pub fn run(session: &Session, format: &str) -> CliResult<()> {
    let result = inspect(session)?;
    match format {
        "json" => print_json(&serde_json::to_value(&result)?),
        "text" => {
            print_text(&result);
            Ok(())
        }
        other => Err(CliError::UnknownFormat(other.to_owned())),
    }
}

/// Collects layouts and counts for every collection.
pub fn inspect(session: &Session) -> CliResult<InspectResult> {
    let db = session.database();
    let kv = db.kv();
    let before = db.stats().snapshot();

    let collections = vec![
        describe(kv.as_ref(), db.items())?,
        describe(kv.as_ref(), db.todos())?,
        describe(kv.as_ref(), db.users())?,
    ];

    let after = db.stats().snapshot();
    Ok(InspectResult {
        path: session.path().display().to_string(),
        collections,
        skipped_records: after.skipped_records - before.skipped_records,
        malformed_blobs: after.malformed_blobs - before.malformed_blobs,
    })
}

fn describe<R: Record>(
    kv: &dyn KvStore,
    handle: CollectionHandle<'_, R>,
) -> CliResult<CollectionInfo> {
    let collection = handle.collection();
    let scheme = collection.keys();
    let keys = match collection.layout() {
        Layout::Blob => usize::from(kv.get(scheme.blob_key())?.is_some()),
        Layout::PerRecord => kv.list(scheme.scan_prefix())?.len(),
    };
    Ok(CollectionInfo {
        name: collection.name(),
        layout: collection.layout(),
        keys,
        records: handle.list()?.len(),
    })
}

fn print_text(result: &InspectResult) {
    println!("Database: {}", result.path);
    println!();
    println!("{:<8} {:<12} {:>6} {:>8}", "NAME", "LAYOUT", "KEYS", "RECORDS");
    for c in &result.collections {
        let layout = match c.layout {
            Layout::Blob => "blob",
            Layout::PerRecord => "per_record",
        };
        println!("{:<8} {:<12} {:>6} {:>8}", c.name, layout, c.keys, c.records);
    }
    println!();
    println!("Skipped records: {}", result.skipped_records);
    println!("Malformed blobs: {}", result.malformed_blobs);
}

#[cfg(test)]
mod tests {
    use super::super::tests::temp_session;
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_keys_and_records_per_layout() {
        let (_dir, session) = temp_session();
        let adapter = session.adapter();
        adapter
            .execute_named("createItem", &json!({"text": "a"}))
            .unwrap();
        adapter
            .execute_named("createItem", &json!({"text": "b"}))
            .unwrap();
        for name in ["Ada", "Grace", "Edsger"] {
            adapter
                .execute_named("createUser", &json!({"name": name, "email": "x@y"}))
                .unwrap();
        }

        let result = inspect(&session).unwrap();
        let items = &result.collections[0];
        assert_eq!((items.name, items.layout), ("items", Layout::Blob));
        assert_eq!((items.keys, items.records), (1, 2));

        let todos = &result.collections[1];
        assert_eq!((todos.keys, todos.records), (0, 0));

        let users = &result.collections[2];
        assert_eq!((users.name, users.layout), ("users", Layout::PerRecord));
        assert_eq!((users.keys, users.records), (3, 3));
        assert_eq!(result.skipped_records, 0);
    }

    #[test]
    fn unreadable_records_are_counted_as_skipped() {
        let (_dir, session) = temp_session();
        let kv = session.database().kv();
        kv.put("users:broken", b"not json").unwrap();

        let result = inspect(&session).unwrap();
        assert_eq!(result.collections[2].keys, 1);
        assert_eq!(result.collections[2].records, 0);
        assert_eq!(result.skipped_records, 1);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let (_dir, session) = temp_session();
        assert!(matches!(
            run(&session, "yaml"),
            Err(CliError::UnknownFormat(_))
        ));
    }
}
