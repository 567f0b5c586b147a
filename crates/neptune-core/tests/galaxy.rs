mod common;

use std::time::Duration;

use common::{galaxy, sample_report, FakeServer};
use neptune_core::{Error, GameState, HasData};
use serde_json::json;

#[test]
fn report_is_fetched_once() {
    let server = FakeServer::new(sample_report());
    let galaxy = galaxy(&server);

    tokio_test::block_on(async {
        let first = galaxy.report().await.unwrap();
        let second = galaxy.report().await.unwrap();
        assert_eq!(first.generation(), 1);
        assert_eq!(second.generation(), 1);
    });

    assert_eq!(server.calls(), 1);

    let request = server.last_request().unwrap();
    assert_eq!(request.endpoint, "order");
    assert!(request
        .params
        .contains(&("order".to_string(), "full_universe_report".to_string())));
    assert!(request
        .params
        .contains(&("game_number".to_string(), "1234".to_string())));
    assert_eq!(request.cookies, "auth=cookie-value");
}

#[tokio::test]
async fn concurrent_first_reads_share_one_fetch() {
    let server = FakeServer::with_delay(sample_report(), Duration::from_millis(50));
    let galaxy = galaxy(&server);
    let other = galaxy.clone();

    let (a, b, stars) = tokio::join!(galaxy.report(), other.report(), galaxy.stars());
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(stars.unwrap().len(), 3);
    assert_eq!(server.calls(), 1);
}

#[tokio::test]
async fn update_state_always_fetches_and_replaces() {
    let server = FakeServer::new(sample_report());
    let galaxy = galaxy(&server);

    let before = galaxy.star(0).await.unwrap();
    assert_eq!(galaxy.generation(), 1);

    let mut renamed = sample_report();
    renamed["stars"]["0"]["n"] = json!("New Sol");
    server.set_report(renamed);

    galaxy.update_state().await.unwrap();
    assert_eq!(server.calls(), 2);
    assert_eq!(galaxy.generation(), 2);

    let after = galaxy.star(0).await.unwrap();
    assert_eq!(after.name().unwrap(), "New Sol");
    assert!(!after.is_stale());

    // The old handle keeps the snapshot it was built from.
    assert_eq!(before.name().unwrap(), "Sol");
    assert_eq!(before.generation(), 1);
    assert!(before.is_stale());
}

#[tokio::test]
async fn failed_fetch_leaves_no_report_and_next_access_retries() {
    let server = FakeServer::new(sample_report());
    server.fail_next(1);
    let galaxy = galaxy(&server);

    let err = galaxy.report().await.unwrap_err();
    assert!(matches!(err, Error::Api { ref message, .. } if message == "must_be_logged_in"));
    assert!(err.is_transport());
    assert_eq!(galaxy.generation(), 0);

    galaxy.report().await.unwrap();
    assert_eq!(server.calls(), 2);
    assert_eq!(galaxy.generation(), 1);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_report() {
    let server = FakeServer::new(sample_report());
    let galaxy = galaxy(&server);
    galaxy.report().await.unwrap();

    server.fail_next(1);
    assert!(galaxy.update_state().await.is_err());

    assert_eq!(galaxy.generation(), 1);
    assert_eq!(galaxy.field("tick").await.unwrap(), json!(42));
    assert_eq!(server.calls(), 2);
}

#[tokio::test]
async fn malformed_report_is_rejected() {
    let server = FakeServer::new(json!(["not", "a", "report"]));
    let galaxy = galaxy(&server);

    assert!(matches!(galaxy.report().await, Err(Error::Malformed(_))));
    assert_eq!(galaxy.generation(), 0);
}

#[tokio::test]
async fn scalar_fields() {
    let server = FakeServer::new(sample_report());
    let galaxy = galaxy(&server);

    assert_eq!(galaxy.game_state().await.unwrap(), GameState::Running);
    assert_eq!(galaxy.now().await.unwrap(), 1_620_000_000.0);
    assert_eq!(galaxy.start_time().await.unwrap(), 1_619_990_000.0);
    assert_eq!(galaxy.now_utc().await.unwrap().timestamp(), 1_620_000_000);
    assert!(galaxy.turn_based().await.unwrap());
}

#[tokio::test]
async fn finished_wins_over_every_other_flag() {
    for (started, paused) in [(false, false), (false, true), (true, false), (true, true)] {
        let mut report = sample_report();
        report["game_over"] = json!(true);
        report["started"] = json!(started);
        report["paused"] = json!(paused);

        let galaxy = galaxy(&FakeServer::new(report));
        assert_eq!(galaxy.game_state().await.unwrap(), GameState::Finished);
    }
}

#[tokio::test]
async fn turn_based_only_for_flag_one() {
    let cases = [
        (json!(1), true),
        (json!(0), false),
        (json!(2), false),
        (json!("1"), false),
    ];
    for (flag, expected) in cases {
        let mut report = sample_report();
        report["turn_based"] = flag;
        let galaxy = galaxy(&FakeServer::new(report));
        assert_eq!(galaxy.turn_based().await.unwrap(), expected);
    }

    let mut report = sample_report();
    report.as_object_mut().unwrap().remove("turn_based");
    let galaxy = galaxy(&FakeServer::new(report));
    assert!(!galaxy.turn_based().await.unwrap());
}

#[tokio::test]
async fn field_forwards_to_report() {
    let server = FakeServer::new(sample_report());
    let galaxy = galaxy(&server);

    assert_eq!(galaxy.field("tick").await.unwrap(), json!(42));
    assert_eq!(galaxy.field("now").await.unwrap(), json!(1_620_000_000.0));
    assert_eq!(galaxy.field("game_state").await.unwrap(), json!("running"));
    assert_eq!(galaxy.field("turn_based").await.unwrap(), json!(true));
    assert_eq!(galaxy.field("player").await.unwrap(), json!(1));

    match galaxy.field("warp_gates").await {
        Err(Error::FieldNotFound { entity, field }) => {
            assert_eq!(entity, "Galaxy");
            assert_eq!(field, "warp_gates");
        }
        other => panic!("expected FieldNotFound, got {:?}", other),
    }
    assert_eq!(server.calls(), 1);
}

#[tokio::test]
async fn players_and_stars_are_dense() {
    let galaxy = galaxy(&FakeServer::new(sample_report()));

    let players = galaxy.players().await.unwrap();
    assert_eq!(players.iter().map(|p| p.index()).collect::<Vec<_>>(), vec![0, 1]);

    let stars = galaxy.stars().await.unwrap();
    assert_eq!(stars.iter().map(|s| s.star_id()).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[tokio::test]
async fn missing_dense_star_is_not_found() {
    let mut report = sample_report();
    report["stars"].as_object_mut().unwrap().remove("1");
    let galaxy = galaxy(&FakeServer::new(report));

    assert!(matches!(
        galaxy.stars().await,
        Err(Error::NotFound { kind: "Star", id: 1 })
    ));
}

#[tokio::test]
async fn fleets_are_sparse() {
    let galaxy = galaxy(&FakeServer::new(sample_report()));

    let fleets = galaxy.fleets().await.unwrap();
    assert_eq!(fleets.len(), 2);
    assert_eq!(fleets.ids().collect::<Vec<_>>(), vec![4, 9]);
    assert_eq!(fleets.get(9).unwrap().fleet_id(), 9);
    assert!(!fleets.contains(5));
    assert!(matches!(fleets.get(5), Err(Error::NotFound { kind: "Fleet", id: 5 })));
    assert!(matches!(galaxy.fleet(0).await, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn admin_and_requesting_player() {
    let galaxy = galaxy(&FakeServer::new(sample_report()));

    let admin = galaxy.admin().await.unwrap();
    assert_eq!(admin.index(), 0);
    assert_eq!(admin.field("alias").unwrap(), json!("Admiral"));

    let me = galaxy.player().await.unwrap();
    assert_eq!(me.index(), 1);
    assert_eq!(me, galaxy.player_at(1).await.unwrap());
}
