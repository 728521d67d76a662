/// End-to-end replication of a single authoritative property
/// A host owns "player1.health"; a remote mirrors it through an in-memory link

use netsync_engine::{
    AuthorityMode, ConnectionState, Message, PropertySettings, ReplicationError, Role,
};
use netsync_engine::shared::PropertyError;
use netsync_test::{
    flush_and_tick, init_logger, link_systems, running_host, running_remote, wait_for,
    PayloadRecorder, TestObject, FLUSH_TIMEOUT, TICK,
};

const HOST_PORT: u16 = 7777;

#[test]
fn host_update_reaches_host_and_remote_callbacks() {
    init_logger();

    let host = running_host(HOST_PORT);
    let remote = running_remote();
    link_systems(&host, &remote).expect("link host to remote");
    link_systems(&remote, &host).expect("link remote to host");

    remote
        .connect_to_server("127.0.0.1", HOST_PORT)
        .expect("remote should connect");
    assert_eq!(remote.connection_state(), ConnectionState::Connected);

    let host_player = TestObject::new("player");
    let host_component = host
        .register_object(&host_player, Some("player1"))
        .expect("host registers player1");
    host_component
        .register_property("health", PropertySettings::authoritative(5.0))
        .expect("host declares health");
    let host_seen = PayloadRecorder::new();
    host_component
        .set_update_callback("health", host_seen.callback())
        .expect("host callback");

    let remote_player = TestObject::new("player");
    let remote_component = remote
        .register_object(&remote_player, Some("player1"))
        .expect("remote registers player1");
    remote_component
        .register_property("health", PropertySettings::authoritative(5.0))
        .expect("remote declares health");
    let remote_seen = PayloadRecorder::new();
    remote_component
        .set_update_callback("health", remote_seen.callback())
        .expect("remote callback");

    // the remote may not write an authoritative property
    let denied = remote_component.send_property_update("health", &[90]);
    assert_eq!(
        denied,
        Err(ReplicationError::Property(PropertyError::AuthorityDenied {
            name: "health".to_string()
        }))
    );

    host_component
        .send_property_update("health", &[100])
        .expect("host may write health");

    // delivery through the link happens on the host's sender worker
    assert!(host.flush(FLUSH_TIMEOUT));
    host.tick(TICK);
    assert_eq!(host_seen.payloads(), vec![vec![100]]);

    assert!(wait_for(FLUSH_TIMEOUT, || {
        remote.tick(TICK);
        remote_seen.count() == 1
    }));
    assert_eq!(remote_seen.payloads(), vec![vec![100]]);

    let expected_size =
        Message::property_update("player1".into(), "health", vec![100], true).wire_size();
    assert_eq!(host.stats().bytes_sent, expected_size as u64);
    assert_eq!(
        host_component.descriptor("health").map(|d| d.authority()),
        Some(AuthorityMode::Authoritative)
    );
}

#[test]
fn remote_connect_message_reaches_host_handler() {
    init_logger();

    let host = running_host(HOST_PORT);
    let remote = running_remote();
    link_systems(&remote, &host).expect("link remote to host");

    let connects = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    {
        let connects = connects.clone();
        host.set_handler(netsync_engine::MessageKind::Connect, move |message| {
            connects
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(message.payload()).to_string());
        });
    }

    remote
        .connect_to_server("10.0.0.1", HOST_PORT)
        .expect("remote should connect");
    assert_eq!(remote.server_address().as_deref(), Some("10.0.0.1:7777"));

    assert!(wait_for(FLUSH_TIMEOUT, || {
        host.tick(TICK);
        !connects.lock().unwrap().is_empty()
    }));
    assert_eq!(*connects.lock().unwrap(), vec!["10.0.0.1:7777".to_string()]);
    assert_eq!(remote.role(), Some(Role::Remote));
}

#[test]
fn unlinked_remote_sees_nothing() {
    init_logger();

    let host = running_host(HOST_PORT);
    let remote = running_remote();

    let host_player = TestObject::new("player");
    let host_component = host.register_object(&host_player, Some("player1")).unwrap();
    host_component
        .register_property("health", PropertySettings::authoritative(5.0))
        .unwrap();

    let remote_player = TestObject::new("player");
    let remote_component = remote
        .register_object(&remote_player, Some("player1"))
        .unwrap();
    remote_component
        .register_property("health", PropertySettings::authoritative(5.0))
        .unwrap();
    let remote_seen = PayloadRecorder::new();
    remote_component
        .set_update_callback("health", remote_seen.callback())
        .unwrap();

    host_component.send_property_update("health", &[1]).unwrap();
    flush_and_tick(&host, &remote);
    assert_eq!(remote_seen.count(), 0);
}
