//! End-to-end behavior of the collection engine over both layouts and
//! both store backends.

use kvrec_core::{
    CollectionConfig, Config, Database, ItemFields, ItemPatch, Layout, TodoFields, TodoPatch,
    UserFields, UserPatch,
};
use kvrec_storage::{FileKv, InMemoryKv, KvStore};
use std::sync::Arc;
use tempfile::TempDir;

const LAYOUTS: [Layout; 2] = [Layout::Blob, Layout::PerRecord];

fn memory_db(layout: Layout) -> (Arc<InMemoryKv>, Database) {
    let kv = Arc::new(InMemoryKv::new());
    let db = Database::open(kv.clone(), &Config::new().with_layout(layout)).unwrap();
    (kv, db)
}

fn todo(title: &str) -> TodoFields {
    TodoFields {
        title: title.into(),
        completed: false,
    }
}

#[test]
fn items_scenario() {
    for layout in LAYOUTS {
        let (_, db) = memory_db(layout);
        let items = db.items();

        assert!(items.list().unwrap().is_empty());

        let item = items
            .create(ItemFields {
                text: "buy milk".into(),
            })
            .unwrap();
        assert!(!item.id.is_empty());
        assert_eq!(item.text, "buy milk");
        assert_eq!(items.list().unwrap(), vec![item.clone()]);

        let updated = items
            .update(
                &item.id,
                ItemPatch {
                    text: Some("buy bread".into()),
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, item.id);
        assert_eq!(updated.text, "buy bread");

        assert!(items.delete(&item.id).unwrap());
        assert!(items.list().unwrap().is_empty(), "{layout:?}");
    }
}

#[test]
fn create_then_get_returns_fields_with_id() {
    for layout in LAYOUTS {
        let (_, db) = memory_db(layout);
        let user = db
            .users()
            .create(UserFields {
                name: "Grace".into(),
                email: "grace@example.com".into(),
            })
            .unwrap();

        let fetched = db.users().get(&user.id).unwrap().unwrap();
        assert_eq!(fetched, user);
        assert_eq!(fetched.name, "Grace");
        assert_eq!(fetched.email, "grace@example.com");
    }
}

#[test]
fn update_changes_only_named_fields() {
    for layout in LAYOUTS {
        let (_, db) = memory_db(layout);
        let created = db.todos().create(todo("read")).unwrap();

        db.todos()
            .update(
                &created.id,
                TodoPatch {
                    completed: Some(true),
                    ..TodoPatch::default()
                },
            )
            .unwrap();

        let fetched = db.todos().get(&created.id).unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, "read");
        assert!(fetched.completed);
    }
}

#[test]
fn update_and_delete_of_unknown_id() {
    for layout in LAYOUTS {
        let (kv, db) = memory_db(layout);
        assert!(db
            .users()
            .update("ghost", UserPatch::default())
            .unwrap()
            .is_none());
        assert!(!db.users().delete("ghost").unwrap());
        assert!(kv.is_empty());
    }
}

#[test]
fn delete_then_get_is_absent() {
    for layout in LAYOUTS {
        let (_, db) = memory_db(layout);
        let a = db.todos().create(todo("a")).unwrap();
        let b = db.todos().create(todo("b")).unwrap();

        assert!(db.todos().delete(&a.id).unwrap());
        assert_eq!(db.todos().get(&a.id).unwrap(), None);
        assert!(!db.todos().delete(&a.id).unwrap());
        assert_eq!(db.todos().list().unwrap(), vec![b]);
    }
}

#[test]
fn sequential_creates_get_distinct_ids() {
    for layout in LAYOUTS {
        let (_, db) = memory_db(layout);
        let a = db.todos().create(todo("a")).unwrap();
        let b = db.todos().create(todo("b")).unwrap();
        assert_ne!(a.id, b.id);

        let listed = db.todos().list().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&a));
        assert!(listed.contains(&b));
    }
}

#[test]
fn list_returns_only_well_formed_records() {
    let kv = Arc::new(InMemoryKv::new());
    kv.put(
        "items",
        br#"[{"id":"good","text":"ok"},{"id":"bad","text":false}]"#,
    )
    .unwrap();
    kv.put("users:good", br#"{"id":"good","name":"n","email":"e"}"#)
        .unwrap();
    kv.put("users:bad", br#"{"id":"bad","name":"n"}"#).unwrap();

    let db = Database::open(kv, &Config::default()).unwrap();

    let items = db.items().list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "good");

    let users = db.users().list().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "good");

    assert_eq!(db.items().get("bad").unwrap(), None);
    assert_eq!(db.users().get("bad").unwrap(), None);
    assert!(db.stats().skipped_records() >= 4);
}

#[test]
fn namespaces_from_config() {
    let kv = Arc::new(InMemoryKv::new());
    let config = Config::new()
        .items(CollectionConfig::per_record().namespace("item"))
        .users(CollectionConfig::blob().namespace("people"));
    let db = Database::open(kv.clone(), &config).unwrap();

    let item = db.items().create(ItemFields { text: "x".into() }).unwrap();
    db.users()
        .create(UserFields {
            name: "n".into(),
            email: "e".into(),
        })
        .unwrap();

    let keys: Vec<String> = kv.snapshot().into_keys().collect();
    assert_eq!(keys, vec![format!("item:{}", item.id), "people".to_owned()]);
}

#[test]
fn file_store_round_trip() {
    let dir = TempDir::new().unwrap();
    for layout in LAYOUTS {
        let kv = Arc::new(FileKv::open(dir.path()).unwrap());
        let db = Database::open(kv, &Config::new().with_layout(layout)).unwrap();

        let todo = db.todos().create(todo("persist me")).unwrap();
        drop(db);

        let kv = Arc::new(FileKv::open(dir.path()).unwrap());
        let db = Database::open(kv, &Config::new().with_layout(layout)).unwrap();
        assert_eq!(db.todos().get(&todo.id).unwrap(), Some(todo.clone()));
        assert!(db.todos().delete(&todo.id).unwrap());
    }
}

#[test]
fn file_store_long_ids_behave_like_any_other() {
    let dir = TempDir::new().unwrap();
    let kv = Arc::new(FileKv::open(dir.path()).unwrap());
    let db = Database::open(kv.clone(), &Config::default()).unwrap();
    let long_id = "x".repeat(200);

    assert_eq!(db.users().collection().layout(), Layout::PerRecord);
    assert_eq!(db.users().get(&long_id).unwrap(), None);
    assert!(!db.users().delete(&long_id).unwrap());
    assert_eq!(
        db.users()
            .update(
                &long_id,
                UserPatch {
                    name: Some("n".into()),
                    email: None,
                },
            )
            .unwrap(),
        None
    );
    assert_eq!(db.items().get(&long_id).unwrap(), None);
    assert!(!db.items().delete(&long_id).unwrap());

    let payload = format!(r#"{{"id":"{long_id}","name":"Long","email":"l@x"}}"#);
    kv.put(&format!("users:{long_id}"), payload.as_bytes()).unwrap();

    let user = db.users().get(&long_id).unwrap().unwrap();
    assert_eq!(user.name, "Long");
    assert_eq!(db.users().list().unwrap(), vec![user]);
    assert!(db.users().delete(&long_id).unwrap());
    assert_eq!(db.users().get(&long_id).unwrap(), None);
    assert!(db.users().list().unwrap().is_empty());
}

#[test]
fn per_record_layout_lists_in_key_order() {
    let kv = Arc::new(InMemoryKv::new());
    for (id, name) in [("b", "second"), ("a", "first"), ("c", "third")] {
        let payload = format!(r#"{{"id":"{id}","name":"{name}","email":"x"}}"#);
        kv.put(&format!("users:{id}"), payload.as_bytes()).unwrap();
    }
    let db = Database::open(kv, &Config::default()).unwrap();

    let names: Vec<String> = db.users().list().unwrap().into_iter().map(|u| u.name).collect();
    assert_eq!(names, ["first", "second", "third"]);
}
