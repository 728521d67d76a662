/// Integration tests for simulated link conditions and session statistics

use std::{sync::Arc, time::Duration};

use netsync_engine::{
    LinkConditionerConfig, Message, ObjectId, ReplicationConfig, ReplicationSystem, Role,
};
use netsync_test::{init_logger, test_config, wait_for, FLUSH_TIMEOUT, TICK};

fn system_with_link(role: Role, link: LinkConditionerConfig) -> Arc<ReplicationSystem> {
    let system = Arc::new(ReplicationSystem::new(ReplicationConfig {
        link_conditioner: Some(link),
        ..test_config()
    }));
    system.initialize(role, 7400).unwrap();
    system
}

#[test]
fn lossy_link_drops_only_unreliable_messages() {
    init_logger();
    let host = system_with_link(Role::Host, LinkConditionerConfig::new(0, 0, 1.0).with_seed(11));

    for _ in 0..4 {
        host.send(Message::custom(1, ObjectId::from("x"), vec![0], false))
            .unwrap();
    }
    host.send(Message::custom(1, ObjectId::from("x"), vec![0], true))
        .unwrap();
    assert!(host.flush(FLUSH_TIMEOUT));

    assert_eq!(host.tick(TICK), 1, "only the reliable message arrives");
    let stats = host.stats();
    assert_eq!(stats.packet_loss_percent, 80.0);
    assert_eq!(
        stats.bytes_sent,
        Message::custom(1, ObjectId::from("x"), vec![0], true).wire_size() as u64,
        "dropped messages are not counted as sent bytes"
    );
}

#[test]
fn perfect_link_reports_no_loss() {
    init_logger();
    let host = system_with_link(Role::Host, LinkConditionerConfig::perfect_condition());

    for _ in 0..5 {
        host.send(Message::custom(2, ObjectId::default(), vec![1, 2], false))
            .unwrap();
    }
    assert!(host.flush(FLUSH_TIMEOUT));
    assert_eq!(host.tick(TICK), 5);

    let stats = host.stats();
    assert_eq!(stats.packet_loss_percent, 0.0);
    assert_eq!(stats.bytes_sent, stats.bytes_received);
    assert!(stats.out_bytes_per_sec > 0.0);
}

#[test]
fn connected_remote_probes_latency() {
    init_logger();
    let remote = system_with_link(Role::Remote, LinkConditionerConfig::new(50, 0, 0.0));
    assert_eq!(remote.stats().latency_ms, 0.0, "no probe before connecting");

    remote.connect_to_server("127.0.0.1", 7400).unwrap();

    assert!(wait_for(Duration::from_secs(2), || remote.stats().latency_ms == 50.0));
}

#[test]
fn stats_reset_after_shutdown() {
    init_logger();
    let host = system_with_link(Role::Host, LinkConditionerConfig::perfect_condition());
    host.send(Message::custom(2, ObjectId::default(), vec![1], true))
        .unwrap();
    assert!(host.flush(FLUSH_TIMEOUT));
    assert!(host.stats().bytes_sent > 0);

    host.shutdown();
    assert_eq!(host.stats(), Default::default());
}

#[test]
fn bandwidth_limits_are_stored_across_sessions() {
    init_logger();
    let system = ReplicationSystem::new(test_config());
    system.set_bandwidth_limits(1000, 2000);
    assert_eq!(system.bandwidth_limits(), (1000, 2000));

    system.initialize(Role::Host, 7401).unwrap();
    system
        .send(Message::custom(0, ObjectId::default(), vec![0; 2048], true))
        .unwrap();
    assert!(system.flush(FLUSH_TIMEOUT), "limits are advisory, traffic still flows");
    assert_eq!(system.bandwidth_limits(), (1000, 2000));
}
