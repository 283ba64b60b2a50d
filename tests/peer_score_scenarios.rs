//! End-to-end scoring scenarios against the synchronous scoring core, using
//! a manual clock so decay and retention assertions don't depend on real
//! time. Each test name matches a scenario from the component design.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use gossipsub_peer_score::connection::StaticConnectionManager;
use gossipsub_peer_score::message::MessageId;
use gossipsub_peer_score::time::ManualClock;
use gossipsub_peer_score::{PeerId, PeerScore, PeerScoreParams, RawMessage, RejectReason, TopicHash, TopicScoreParams};

fn ip(last: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(1, 2, 3, last))
}

fn topic(name: &str) -> TopicHash {
    TopicHash::from(name)
}

fn peer(name: &str) -> PeerId {
    PeerId::from(name)
}

fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

fn score_with(topic_params: TopicScoreParams) -> (Arc<ManualClock>, PeerScore) {
    let clock = Arc::new(ManualClock::new());
    let mut params = PeerScoreParams::default();
    params.topics.insert(topic("T"), topic_params);
    (clock.clone(), PeerScore::new(params, clock))
}

#[test]
fn s1_time_in_mesh() {
    let mut topic_params = TopicScoreParams::default();
    topic_params.topic_weight = 0.5;
    topic_params.time_in_mesh_weight = 1.0;
    topic_params.time_in_mesh_quantum = Duration::from_millis(1);
    topic_params.time_in_mesh_cap = 3600.0;
    let (clock, mut score) = score_with(topic_params);

    let a = peer("A");
    score.add_peer(a.clone(), vec![]);
    score.graft(&a, topic("T"));
    clock.advance(Duration::from_millis(100));
    score.refresh_scores();

    assert!(approx_eq(score.score(&a), 50.0, 1.0));
}

#[test]
fn s2_first_delivery_cap() {
    let mut topic_params = TopicScoreParams::default();
    topic_params.topic_weight = 1.0;
    topic_params.first_message_deliveries_weight = 1.0;
    topic_params.first_message_deliveries_decay = 0.9;
    topic_params.first_message_deliveries_cap = 50.0;
    let (_clock, mut score) = score_with(topic_params);

    let a = peer("A");
    score.add_peer(a.clone(), vec![]);
    let msg = RawMessage::new(a.clone(), vec![topic("T")]);

    for i in 0..100 {
        let id = MessageId::from(format!("m{i}"));
        score.validate_message(&id);
        score.deliver_message(&id, &msg);
    }

    score.refresh_scores();
    assert!(approx_eq(score.score(&a), 45.0, 1e-9));
}

#[test]
fn s3_mesh_delivery_penalty() {
    let mut topic_params = TopicScoreParams::default();
    // isolate the mesh-delivery-deficit term from time-in-mesh/first-delivery
    // noise so the expected values below are exact.
    topic_params.time_in_mesh_weight = 0.0;
    topic_params.mesh_message_deliveries_weight = -1.0;
    topic_params.mesh_message_deliveries_activation = Duration::from_millis(1000);
    topic_params.mesh_message_deliveries_window = Duration::from_millis(10);
    topic_params.mesh_message_deliveries_threshold = 20.0;
    topic_params.mesh_message_deliveries_cap = 100.0;
    topic_params.mesh_message_deliveries_decay = 0.9;
    let (clock, mut score) = score_with(topic_params);

    let (a, b, c) = (peer("A"), peer("B"), peer("C"));
    for p in [&a, &b, &c] {
        score.add_peer(p.clone(), vec![]);
        score.graft(p, topic("T"));
    }
    clock.advance(Duration::from_millis(1001));
    score.refresh_scores(); // activates mesh_message_deliveries_active for all three

    let msg_a = RawMessage::new(a.clone(), vec![topic("T")]);
    let msg_b = RawMessage::new(b.clone(), vec![topic("T")]);
    let msg_c = RawMessage::new(c.clone(), vec![topic("T")]);

    for i in 0..100 {
        let id = MessageId::from(format!("m{i}"));
        score.validate_message(&id);
        score.deliver_message(&id, &msg_a);
        score.duplicate_message(&id, &msg_b);
        clock.advance(Duration::from_millis(15));
        score.duplicate_message(&id, &msg_c);
    }

    score.refresh_scores();
    assert!(score.score(&a) >= 0.0);
    assert!(score.score(&b) >= 0.0);
    // C's duplicates always arrive 15ms after validation, past the 10ms
    // window, so none of them count: the full deficit penalty applies,
    // squared and unweighted by decay (only the stored counter decays, and
    // it never left zero).
    assert!(approx_eq(score.score(&c), -400.0, 1e-9));
}

#[test]
fn s4_prune_failure_penalty() {
    let mut topic_params = TopicScoreParams::default();
    topic_params.mesh_failure_penalty_weight = -1.0;
    topic_params.mesh_failure_penalty_decay = 0.9;
    topic_params.mesh_message_deliveries_threshold = 20.0;
    topic_params.mesh_message_deliveries_activation = Duration::from_millis(1000);
    let (clock, mut score) = score_with(topic_params);

    let b = peer("B");
    score.add_peer(b.clone(), vec![]);
    score.graft(&b, topic("T"));
    clock.advance(Duration::from_millis(1010));
    score.refresh_scores();

    score.prune(&b, topic("T"));
    score.refresh_scores();

    assert!(approx_eq(score.score(&b), -360.0, 1.0));
}

#[test]
fn s5_invalid_deliveries_squared() {
    let mut topic_params = TopicScoreParams::default();
    topic_params.topic_weight = 1.0;
    topic_params.invalid_message_deliveries_weight = -1.0;
    topic_params.invalid_message_deliveries_decay = 0.9;
    let (_clock, mut score) = score_with(topic_params);

    let a = peer("A");
    score.add_peer(a.clone(), vec![]);
    score.graft(&a, topic("T"));
    let msg = RawMessage::new(a.clone(), vec![topic("T")]);

    for i in 0..100 {
        let id = MessageId::from(format!("m{i}"));
        score.validate_message(&id);
        score.reject_message(&id, &msg, RejectReason::Invalid);
    }

    score.refresh_scores();
    assert!(approx_eq(score.score(&a), -8100.0, 1.0));
}

#[test]
fn s6_ip_colocation() {
    let mut params = PeerScoreParams::default();
    params.ip_colocation_factor_threshold = 1.0;
    params.ip_colocation_factor_weight = -1.0;
    let clock = Arc::new(ManualClock::new());
    let mut score = PeerScore::new(params, clock);

    let (a, b, c, d) = (peer("A"), peer("B"), peer("C"), peer("D"));
    score.add_peer(a.clone(), vec![ip(1)]);
    score.add_peer(b.clone(), vec![ip(2)]);
    score.add_peer(c.clone(), vec![ip(2), ip(3)]);
    score.add_peer(d.clone(), vec![ip(2)]);

    assert_eq!(score.score(&a), 0.0);
    assert!(approx_eq(score.score(&b), -4.0, 1e-9));
    assert!(approx_eq(score.score(&c), -4.0, 1e-9));
    assert!(approx_eq(score.score(&d), -4.0, 1e-9));
}

#[test]
fn s7_behaviour_penalty() {
    let mut params = PeerScoreParams::default();
    params.behaviour_penalty_weight = -1.0;
    params.behaviour_penalty_decay = 0.99;
    params.behaviour_penalty_threshold = 0.0;
    let clock = Arc::new(ManualClock::new());
    let mut score = PeerScore::new(params, clock);

    let a = peer("A");
    score.add_peer(a.clone(), vec![]);

    score.add_penalty(&a, 1.0);
    assert!(approx_eq(score.score(&a), -1.0, 1e-9));

    score.add_penalty(&a, 1.0);
    assert!(approx_eq(score.score(&a), -4.0, 1e-9));

    score.refresh_scores();
    assert!(approx_eq(score.score(&a), -(2.0f64 * 0.99).powi(2), 1e-6));
}

#[test]
fn s8_retention() {
    let mut params = PeerScoreParams::default();
    params.app_specific_score = Arc::new(|_| -1000.0);
    params.app_specific_weight = 1.0;
    params.retain_score = Duration::from_millis(800);
    let clock = Arc::new(ManualClock::new());
    let mut score = PeerScore::new(params, clock.clone());

    let a = peer("A");
    score.add_peer(a.clone(), vec![]);
    score.graft(&a, topic("T"));
    score.refresh_scores();
    assert_eq!(score.score(&a), -1000.0);

    score.remove_peer(&a); // score <= 0, so retained rather than dropped
    clock.advance(Duration::from_millis(400));
    score.refresh_scores();
    assert_eq!(score.score(&a), -1000.0);

    clock.advance(Duration::from_millis(405));
    score.refresh_scores();
    assert_eq!(score.score(&a), 0.0);
}

#[test]
fn invalid_message_fans_out_to_earlier_forwarders() {
    let mut topic_params = TopicScoreParams::default();
    topic_params.invalid_message_deliveries_weight = -1.0;
    let (_clock, mut score) = score_with(topic_params);

    let (a, b) = (peer("A"), peer("B"));
    score.add_peer(a.clone(), vec![]);
    score.add_peer(b.clone(), vec![]);

    let id = MessageId::from("m1");
    let msg_a = RawMessage::new(a.clone(), vec![topic("T")]);
    let msg_b = RawMessage::new(b.clone(), vec![topic("T")]);

    score.validate_message(&id);
    score.duplicate_message(&id, &msg_a); // A forwards before anyone validates
    score.reject_message(&id, &msg_b, RejectReason::Invalid);

    assert!(score.score(&a) < 0.0);
    assert!(score.score(&b) < 0.0);
}

#[test]
fn update_ips_reconciles_colocation_after_reconnect() {
    let mut params = PeerScoreParams::default();
    params.ip_colocation_factor_threshold = 1.0;
    params.ip_colocation_factor_weight = -1.0;
    let clock = Arc::new(ManualClock::new());
    let mut score = PeerScore::new(params, clock);

    let connections = StaticConnectionManager::new();
    let (a, b) = (peer("A"), peer("B"));
    score.add_peer(a.clone(), vec![]);
    score.add_peer(b.clone(), vec![]);
    connections.set(a.clone(), vec![ip(9)]);
    connections.set(b.clone(), vec![ip(9)]);

    score.update_ips(&connections);
    assert!(score.score(&a) < 0.0);

    connections.set(b.clone(), vec![ip(10)]);
    score.update_ips(&connections);
    assert_eq!(score.score(&a), 0.0);
}
