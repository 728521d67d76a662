/// Integration tests for object registration and expiry
/// The directory never keeps objects alive; dropped objects vanish on tick

use std::sync::Arc;

use netsync_engine::{shared::DirectoryError, ReplicationError};
use netsync_test::{init_logger, running_host, running_remote, TestObject, TICK};

#[test]
fn generated_ids_use_role_prefix() {
    init_logger();
    let host = running_host(7100);
    let remote = running_remote();

    let host_object = TestObject::new("tree");
    let remote_object = TestObject::new("tree");

    let host_id = host.register_object(&host_object, None).unwrap();
    let remote_id = remote.register_object(&remote_object, Some("")).unwrap();

    assert!(host_id.object_id().as_str().starts_with('H'));
    assert!(remote_id.object_id().as_str().starts_with('R'));
}

#[test]
fn duplicate_live_id_is_rejected() {
    init_logger();
    let host = running_host(7101);
    let first = TestObject::new("first");
    let second = TestObject::new("second");

    host.register_object(&first, Some("shared")).unwrap();
    let result = host.register_object(&second, Some("shared"));

    assert!(matches!(
        result,
        Err(ReplicationError::Directory(DirectoryError::DuplicateId { .. }))
    ));
}

#[test]
fn same_object_registers_only_once() {
    init_logger();
    let host = running_host(7102);
    let object = TestObject::new("rock");

    host.register_object(&object, Some("rock1")).unwrap();
    let result = host.register_object(&object, Some("rock2"));

    assert_eq!(
        result.err(),
        Some(ReplicationError::Directory(
            DirectoryError::ObjectAlreadyRegistered {
                object_id: "rock1".to_string()
            }
        ))
    );
}

#[test]
fn dropped_objects_are_swept_on_tick() {
    init_logger();
    let host = running_host(7103);
    let kept = TestObject::new("kept");
    let dropped = TestObject::new("dropped");

    host.register_object(&kept, Some("kept")).unwrap();
    host.register_object(&dropped, Some("dropped")).unwrap();
    assert_eq!(host.object_count(), 2);

    drop(dropped);
    assert_eq!(host.object_count(), 2, "expired entries linger until a tick");

    host.tick(TICK);
    assert_eq!(host.object_count(), 1);
    assert!(host.component("kept").is_ok());
    assert!(matches!(
        host.component("dropped"),
        Err(ReplicationError::Directory(DirectoryError::NotFound { .. }))
    ));
}

#[test]
fn expired_id_can_be_reclaimed() {
    init_logger();
    let host = running_host(7104);

    let old = TestObject::new("old");
    host.register_object(&old, Some("slot")).unwrap();
    drop(old);

    let new = TestObject::new("new");
    let component = host.register_object(&new, Some("slot")).unwrap();
    assert_eq!(component.object_id().as_str(), "slot");
}

#[test]
fn unregister_by_object_and_by_id() {
    init_logger();
    let host = running_host(7105);
    let a = TestObject::new("a");
    let b = TestObject::new("b");

    host.register_object(&a, Some("a")).unwrap();
    host.register_object(&b, Some("b")).unwrap();

    assert_eq!(host.unregister_object(&a).map(|id| id.to_string()), Some("a".to_string()));
    assert_eq!(host.unregister_object(&a), None, "second unregister is a no-op");
    assert!(host.unregister_id("b"));
    assert!(!host.unregister_id("b"));
    assert_eq!(host.object_count(), 0);

    // the application still owns its objects
    assert_eq!(Arc::strong_count(&a), 1);
}

#[test]
fn component_lookup_keeps_property_registry() {
    init_logger();
    let host = running_host(7106);
    let object = TestObject::new("lamp");
    let component = host.register_object(&object, Some("lamp")).unwrap();
    component
        .register_property(
            "lit",
            netsync_engine::PropertySettings::authoritative(2.0),
        )
        .unwrap();

    let looked_up = host.component("lamp").unwrap();
    assert!(looked_up.properties().contains("lit"));
}
