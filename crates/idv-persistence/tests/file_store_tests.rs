use idv_core::{SessionStore, StoreKey};
use idv_domain::{Session, SessionProgress, StepKind};
use idv_persistence::{FileSessionStore, PersistenceError, StoreConfig};

fn session() -> Session {
    Session::new(Some("sess-1".into()),
                 "tok-1",
                 StepKind::parse_list(&["selfie", "terms", "signature"]),
                 Default::default(),
                 None).unwrap()
}

#[test]
fn values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");
    {
        let store = FileSessionStore::open(&path).unwrap();
        store.set(StoreKey::CustomerId, "cust-1").unwrap();
        store.save_session(&session()).unwrap();
    }
    let reopened = FileSessionStore::open(&path).unwrap();
    assert_eq!(reopened.customer_id().unwrap().as_deref(), Some("cust-1"));
    assert_eq!(reopened.session_token().unwrap().as_deref(), Some("tok-1"));
    assert_eq!(reopened.required_steps().unwrap(),
               Some(vec![StepKind::Selfie, StepKind::Terms, StepKind::Signature]));
}

#[test]
fn clear_operations_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileSessionStore::open(&path).unwrap();
    store.set(StoreKey::CustomerId, "cust-1").unwrap();
    store.set(StoreKey::DeviceId, "dev-1").unwrap();
    store.save_session(&session()).unwrap();
    store.set_session_progress(&SessionProgress::default()).unwrap();

    store.clear_configuration().unwrap();
    let reopened = FileSessionStore::open(&path).unwrap();
    assert!(reopened.required_steps().unwrap().is_none());
    assert_eq!(reopened.session_token().unwrap().as_deref(), Some("tok-1"));

    reopened.clear_device_identifier().unwrap();
    assert!(reopened.device_id().unwrap().is_none());
    assert!(reopened.session_id().unwrap().is_none());
    assert_eq!(reopened.customer_id().unwrap().as_deref(), Some("cust-1"));

    reopened.clear_all().unwrap();
    assert!(FileSessionStore::open(&path).unwrap().snapshot().unwrap().is_empty());
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(matches!(FileSessionStore::open(&path), Err(PersistenceError::Corrupt(_))));
}

#[test]
fn empty_file_is_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "").unwrap();
    let store = FileSessionStore::from_config(&StoreConfig::at(&path)).unwrap();
    assert!(store.customer_id().unwrap().is_none());
    assert_eq!(store.path(), path.as_path());
}

#[test]
fn corrupt_value_surfaces_as_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, r#"{"required_steps": "not-a-list"}"#).unwrap();
    let store = FileSessionStore::open(&path).unwrap();
    assert!(store.required_steps().is_err());
}

#[test]
fn failed_write_leaves_memory_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileSessionStore::open(&path).unwrap();
    store.set(StoreKey::CustomerId, "cust-1").unwrap();

    // Un directorio en la ruta hace fallar el rename.
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    assert!(store.set(StoreKey::SessionToken, "tok-x").is_err());
    assert!(store.session_token().unwrap().is_none());
    assert!(store.save_session(&session()).is_err());
    assert!(store.required_steps().unwrap().is_none());
    assert!(store.remove(StoreKey::CustomerId).is_err());
    assert_eq!(store.customer_id().unwrap().as_deref(), Some("cust-1"));
    assert!(!path.with_extension("json.tmp").exists());
}
