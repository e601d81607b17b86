//! Full cycles against mocked SWPC feeds and a mocked Discord API.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spacewx_bot::{AlertScheduler, KindOutcome};
use spacewx_core::config::FeedConfig;
use spacewx_core::AlertKind;
use spacewx_feeds::FeedClient;
use spacewx_notify::DiscordNotifier;
use spacewx_rules::CooldownTracker;

fn feeds(server: &MockServer) -> FeedConfig {
    let base = server.uri();
    FeedConfig {
        kp_index_url: format!("{base}/kp"),
        kp_forecast_url: format!("{base}/forecast"),
        aurora_url: format!("{base}/aurora"),
        xray_url: format!("{base}/xray"),
        timeout: Duration::from_secs(2),
        user_agent: "spacewx-it/1.0".to_string(),
    }
}

async fn mount_discord(server: &MockServer, expected_posts: u64) {
    Mock::given(method("GET"))
        .and(path("/users/@me/guilds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1", "name": "Sky"}])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guilds/1/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "11", "name": "general", "type": 0, "position": 0}
        ])))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/channels/11/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m"})))
        .expect(expected_posts)
        .mount(server)
        .await;
}

#[tokio::test]
async fn two_failed_feeds_do_not_block_two_alerts() {
    let swpc = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/kp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            ["time_tag", "Kp", "a_running", "station_count"],
            ["2024-05-10 18:00:00.000", "7.67", "179", "8"],
            ["2024-05-10 21:00:00.000", "8.67", "207", "8"]
        ])))
        .mount(&swpc)
        .await;
    Mock::given(method("GET"))
        .and(path("/xray"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"time_tag": "2024-05-10T21:00:00Z", "flux": 2e-4, "energy": "0.1-0.8nm"},
            {"time_tag": "2024-05-10T21:00:00Z", "flux": 5e-5, "energy": "0.05-0.4nm"}
        ])))
        .mount(&swpc)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&swpc)
        .await;
    Mock::given(method("GET"))
        .and(path("/aurora"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&swpc)
        .await;

    let discord = MockServer::start().await;
    mount_discord(&discord, 2).await;

    let notifier = Arc::new(DiscordNotifier::new("token", discord.uri(), "general").unwrap());
    let scheduler = AlertScheduler::new(
        Arc::new(FeedClient::new(feeds(&swpc))),
        notifier,
        CooldownTracker::new(),
    );

    let report = scheduler.run_cycle().await.unwrap();
    assert_eq!(report.notified(), 2);
    assert_eq!(report.failures(), 2);
    assert!(matches!(report.outcome(AlertKind::ForecastStorm), Some(KindOutcome::FetchFailed { .. })));
    assert!(matches!(report.outcome(AlertKind::AuroraVisibility), Some(KindOutcome::FetchFailed { .. })));

    let cooldowns = scheduler.cooldowns();
    assert!(cooldowns.last_fired(AlertKind::SevereGeomagneticStorm).is_some());
    assert!(cooldowns.last_fired(AlertKind::RadioBlackout).is_some());
    assert!(cooldowns.last_fired(AlertKind::ForecastStorm).is_none());

    // Same conditions on the next poll stay quiet.
    let again = scheduler.run_cycle().await.unwrap();
    assert_eq!(again.notified(), 0);
    assert!(matches!(
        again.outcome(AlertKind::RadioBlackout),
        Some(KindOutcome::Suppressed { .. })
    ));

    let posts: Vec<String> = discord
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/channels/11/messages")
        .map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).unwrap()["content"].as_str().unwrap().to_string())
        .collect();
    assert!(posts.iter().any(|p| p.contains("**8.67** (Severe)")));
    assert!(posts.iter().any(|p| p.contains("**R3 (Strong)**") && p.contains("2.0e-4")));
}

#[tokio::test]
async fn rejected_delivery_is_retried_next_cycle() {
    let swpc = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            ["time_tag", "kp", "observed", "noaa_scale"],
            ["2024-05-11 00:00:00", "7.33", "predicted", "G3"]
        ])))
        .mount(&swpc)
        .await;

    let discord = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/guilds"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&discord)
        .await;

    let notifier = Arc::new(DiscordNotifier::new("token", discord.uri(), "general").unwrap());
    let scheduler = AlertScheduler::new(Arc::new(FeedClient::new(feeds(&swpc))), notifier, CooldownTracker::new())
        .with_kinds([AlertKind::ForecastStorm]);

    for _ in 0..2 {
        let report = scheduler.run_cycle().await.unwrap();
        assert!(matches!(
            report.outcome(AlertKind::ForecastStorm),
            Some(KindOutcome::NotifyFailed { .. })
        ));
    }
    assert!(scheduler.cooldowns().last_fired(AlertKind::ForecastStorm).is_none());
}
