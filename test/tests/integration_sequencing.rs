/// Integration tests for ordering of property updates on the receiving side
/// Authoritative updates older than the last applied one are discarded

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use netsync_engine::{
    shared::MessageStamp, Message, NetworkComponent, ObjectId, PropertySettings,
    ReplicationSystem, Role,
};
use netsync_test::{
    init_logger, link_systems, running_host, running_remote, test_config, wait_for,
    PayloadRecorder, TestObject, FLUSH_TIMEOUT, TICK,
};

const HOST_EPOCH: u64 = 1;

fn update(property: &str, payload: u8, sequence: u16) -> Message {
    Message::property_update(ObjectId::from("player1"), property, vec![payload], true).stamped(
        MessageStamp {
            origin: Some(Role::Host),
            epoch: HOST_EPOCH,
            sequence,
            sent_at: 0,
        },
    )
}

fn player_with_health(system: &ReplicationSystem, object: &Arc<TestObject>) -> NetworkComponent {
    let component = system.register_object(object, Some("player1")).unwrap();
    component
        .register_property("health", PropertySettings::authoritative(5.0))
        .unwrap();
    component
}

#[test]
fn stale_authoritative_updates_are_dropped() {
    init_logger();
    let remote = running_remote();
    let object = TestObject::new("player");
    let component = remote.register_object(&object, Some("player1")).unwrap();
    component
        .register_property("health", PropertySettings::authoritative(5.0))
        .unwrap();
    let seen = PayloadRecorder::new();
    component
        .set_update_callback("health", seen.callback())
        .unwrap();

    remote.receive(update("health", 50, 5)).unwrap();
    remote.receive(update("health", 30, 3)).unwrap();
    remote.receive(update("health", 60, 6)).unwrap();
    remote.receive(update("health", 60, 6)).unwrap();
    assert_eq!(remote.tick(TICK), 4);

    assert_eq!(seen.payloads(), vec![vec![50], vec![60]]);
    assert_eq!(
        component.descriptor("health").and_then(|d| d.last_applied_sequence()),
        Some(6)
    );
}

#[test]
fn sequence_wraparound_is_newer() {
    init_logger();
    let remote = running_remote();
    let object = TestObject::new("player");
    let component = remote.register_object(&object, Some("player1")).unwrap();
    component
        .register_property("health", PropertySettings::authoritative(5.0))
        .unwrap();
    let seen = PayloadRecorder::new();
    component
        .set_update_callback("health", seen.callback())
        .unwrap();

    remote.receive(update("health", 1, u16::MAX)).unwrap();
    remote.receive(update("health", 2, 0)).unwrap();
    remote.tick(TICK);

    assert_eq!(seen.payloads(), vec![vec![1], vec![2]]);
}

#[test]
fn predictive_updates_apply_in_arrival_order() {
    init_logger();
    let remote = running_remote();
    let object = TestObject::new("player");
    let component = remote.register_object(&object, Some("player1")).unwrap();
    component
        .register_property("aim", PropertySettings::predictive(60.0))
        .unwrap();
    let seen = PayloadRecorder::new();
    component.set_update_callback("aim", seen.callback()).unwrap();

    remote.receive(update("aim", 9, 9)).unwrap();
    remote.receive(update("aim", 4, 4)).unwrap();
    remote.tick(TICK);

    assert_eq!(seen.payloads(), vec![vec![9], vec![4]]);
}

#[test]
fn updates_for_unknown_targets_are_dropped_quietly() {
    init_logger();
    let remote = running_remote();
    let object = TestObject::new("player");
    let component = remote.register_object(&object, Some("player1")).unwrap();
    component
        .register_property("health", PropertySettings::authoritative(5.0))
        .unwrap();

    remote.receive(update("mana", 1, 1)).unwrap();
    remote
        .receive(
            Message::property_update(ObjectId::from("nobody"), "health", vec![1], true)
                .stamped(MessageStamp {
                    origin: Some(Role::Host),
                    epoch: HOST_EPOCH,
                    sequence: 2,
                    sent_at: 0,
                }),
        )
        .unwrap();
    assert_eq!(remote.tick(TICK), 2);

    drop(object);
    remote.receive(update("health", 1, 3)).unwrap();
    assert_eq!(remote.tick(TICK), 1);
    assert_eq!(remote.object_count(), 0);
}

#[test]
fn unrelated_traffic_does_not_make_updates_stale() {
    init_logger();
    let host = running_host(7500);
    let remote = running_remote();
    link_systems(&host, &remote).unwrap();

    let host_player = TestObject::new("player");
    let host_component = player_with_health(&host, &host_player);
    let remote_player = TestObject::new("player");
    let remote_component = player_with_health(&remote, &remote_player);
    let seen = PayloadRecorder::new();
    remote_component
        .set_update_callback("health", seen.callback())
        .unwrap();

    let start = Instant::now();
    host_component
        .send_property_update_at("health", &[1], start)
        .unwrap();
    // more than half the sequence space of other messages in between
    for _ in 0..40_000 {
        host.send(Message::custom(1, ObjectId::default(), Vec::new(), true))
            .unwrap();
    }
    host_component
        .send_property_update_at("health", &[2], start + Duration::from_secs(1))
        .unwrap();

    assert!(host.flush(Duration::from_secs(30)));
    remote.tick(TICK);
    assert_eq!(seen.payloads(), vec![vec![1], vec![2]]);
}

#[test]
fn restarted_host_is_not_treated_as_stale() {
    init_logger();
    let host = Arc::new(ReplicationSystem::new(test_config()));
    let remote = running_remote();
    let remote_player = TestObject::new("player");
    let remote_component = player_with_health(&remote, &remote_player);
    let seen = PayloadRecorder::new();
    remote_component
        .set_update_callback("health", seen.callback())
        .unwrap();

    let start = Instant::now();
    host.initialize(Role::Host, 7501).unwrap();
    link_systems(&host, &remote).unwrap();
    let first_player = TestObject::new("player");
    let first = player_with_health(&host, &first_player);
    for n in 0..3u8 {
        first
            .send_property_update_at("health", &[n], start + Duration::from_secs(u64::from(n)))
            .unwrap();
    }
    assert!(host.flush(FLUSH_TIMEOUT));
    remote.tick(TICK);
    assert_eq!(seen.count(), 3);

    host.shutdown();
    host.initialize(Role::Host, 7501).unwrap();
    link_systems(&host, &remote).unwrap();
    let second_player = TestObject::new("player");
    let second = player_with_health(&host, &second_player);
    second.send_property_update("health", &[9]).unwrap();

    assert!(wait_for(FLUSH_TIMEOUT, || {
        remote.tick(TICK);
        seen.count() == 4
    }));
    assert_eq!(seen.payloads().last(), Some(&vec![9]));
}

#[test]
fn remote_cannot_overwrite_authoritative_state_by_sending_raw_updates() {
    init_logger();
    let host = running_host(7502);
    let remote = running_remote();
    link_systems(&remote, &host).unwrap();

    let host_player = TestObject::new("player");
    let host_component = player_with_health(&host, &host_player);
    let seen = PayloadRecorder::new();
    host_component
        .set_update_callback("health", seen.callback())
        .unwrap();

    remote
        .send(Message::property_update(
            ObjectId::from("player1"),
            "health",
            vec![66],
            true,
        ))
        .unwrap();
    assert!(remote.flush(FLUSH_TIMEOUT));
    assert_eq!(host.tick(TICK), 1);
    assert_eq!(seen.count(), 0, "a remote has no authority over health");

    host_component.send_property_update("health", &[100]).unwrap();
    assert!(host.flush(FLUSH_TIMEOUT));
    host.tick(TICK);
    assert_eq!(seen.payloads(), vec![vec![100]]);
}
