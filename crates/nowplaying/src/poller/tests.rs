use super::*;
use crate::{
    config,
    testing::{json, read_input_data, MockServer},
};
use wiremock::{matchers::*, Mock, ResponseTemplate};

const TRACK: &str = "Now Playing: Daft Punk - One More Time (in Discovery)";

fn config(server: &MockServer) -> Config {
    Config {
        spotify: config::Spotify {
            client_id: "some_id".into(),
            client_secret: Secret("some_secret".into()),
            refresh_token: Secret("the_refresh_token".into()),
            token_url: server.url(MockServer::TOKEN),
            player_url: server.url(MockServer::PLAYER),
        },
        ntfy: config::Ntfy {
            url: server.url(MockServer::NTFY),
        },
        polling: Polling {
            interval: Duration::from_millis(10),
            session: Duration::from_millis(300),
            http_timeout: Duration::from_secs(5),
            restart_delay: Duration::from_millis(10),
            exit_on_auth_failure: false,
            skip_unrecognized: false,
        },
    }
}

async fn start(player: &str) -> MockServer {
    let server = MockServer::start().await;
    server.mock_token(&read_input_data("token.json").await).await;
    server
        .mock_player(json(200, &read_input_data(player).await))
        .await;
    server.mock_ntfy().await;
    server
}

#[tokio::test]
async fn dispatches_track() {
    let server = start("player_track.json").await;
    let report = Poller::new(&config(&server)).run_session().await.unwrap();

    assert!(report.polls > 0);
    assert_eq!(report.dispatched, report.polls);

    let sent = server.received("POST", MockServer::NTFY).await;
    assert_eq!(sent.len(), report.polls);
    assert!(sent.iter().all(|msg| msg == TRACK), "{sent:?}");
}

#[tokio::test]
async fn requests_episodes_with_bearer() {
    let server = MockServer::start().await;
    server.mock_token(&read_input_data("token.json").await).await;
    server
        .register(
            Mock::given(method("GET"))
                .and(path(MockServer::PLAYER))
                .and(query_param("additional_types", "episode"))
                .and(header("authorization", "Bearer BQDj3pZ_access"))
                .respond_with(json(200, &read_input_data("player_episode.json").await)),
        )
        .await;
    server.mock_ntfy().await;

    let report = Poller::new(&config(&server)).run_session().await.unwrap();
    assert_eq!(report.failed, 0);

    let sent = server.received("POST", MockServer::NTFY).await;
    assert_eq!(
        sent.first().map(|s| &**s),
        Some("You are now listening to: 102.3, REAL Rustacean Station FM, where we play NOTHING but Episode 12: Borrow Checking")
    );
}

#[tokio::test]
async fn single_has_no_album() {
    let server = start("player_single.json").await;
    Poller::new(&config(&server)).run_session().await.unwrap();

    let sent = server.received("POST", MockServer::NTFY).await;
    assert_eq!(sent.first().map(|s| &**s), Some("Now Playing: M83 - Midnight City"));
}

#[tokio::test]
async fn idle_does_not_dispatch() {
    let server = start("player_paused.json").await;
    let report = Poller::new(&config(&server)).run_session().await.unwrap();

    assert!(report.polls > 0);
    assert_eq!(report.idle, report.polls);
    assert!(server.received("POST", MockServer::NTFY).await.is_empty());
}

#[tokio::test]
async fn unrecognized_dispatches_empty() {
    let server = start("player_ad.json").await;
    let report = Poller::new(&config(&server)).run_session().await.unwrap();

    assert_eq!(report.dispatched, report.polls);
    let sent = server.received("POST", MockServer::NTFY).await;
    assert!(!sent.is_empty());
    assert!(sent.iter().all(String::is_empty), "{sent:?}");
}

#[tokio::test]
async fn unrecognized_can_be_skipped() {
    let server = start("player_ad.json").await;
    let mut config = config(&server);
    config.polling.skip_unrecognized = true;

    let report = Poller::new(&config).run_session().await.unwrap();
    assert_eq!(report.idle, report.polls);
    assert!(server.received("POST", MockServer::NTFY).await.is_empty());
}

#[tokio::test]
async fn survives_bad_responses() {
    let server = MockServer::start().await;
    server.mock_token(&read_input_data("token.json").await).await;
    server
        .register(
            Mock::given(method("GET"))
                .and(path(MockServer::PLAYER))
                .respond_with(json(200, "{ this is not json"))
                .up_to_n_times(1),
        )
        .await;
    server
        .register(
            Mock::given(method("GET"))
                .and(path(MockServer::PLAYER))
                .respond_with(ResponseTemplate::new(204))
                .up_to_n_times(1),
        )
        .await;
    server
        .mock_player(json(200, &read_input_data("player_track.json").await))
        .await;
    server.mock_ntfy().await;

    let report = Poller::new(&config(&server)).run_session().await.unwrap();
    assert_eq!(report.failed, 2);
    assert!(report.dispatched > 0, "{report}");
    assert_eq!(
        server.received("POST", MockServer::NTFY).await.first().map(|s| &**s),
        Some(TRACK)
    );
}

#[tokio::test]
async fn failed_dispatch_is_ignored() {
    let server = MockServer::start().await;
    server.mock_token(&read_input_data("token.json").await).await;
    server
        .mock_player(json(200, &read_input_data("player_track.json").await))
        .await;
    server
        .register(
            Mock::given(method("POST"))
                .and(path(MockServer::NTFY))
                .respond_with(ResponseTemplate::new(500)),
        )
        .await;

    let report = Poller::new(&config(&server)).run_session().await.unwrap();
    assert!(report.polls > 1, "{report}");
    assert_eq!(report.dispatched, report.polls);
}

#[tokio::test]
async fn one_token_per_session() {
    let server = start("player_track.json").await;
    let poller = Poller::new(&config(&server));

    poller.run_session().await.unwrap();
    let tokens = server.received("POST", MockServer::TOKEN).await;
    assert_eq!(tokens, ["grant_type=refresh_token&refresh_token=the_refresh_token"]);

    poller.run_session().await.unwrap();
    assert_eq!(server.received("POST", MockServer::TOKEN).await.len(), 2);
}

#[tokio::test]
async fn run_starts_a_new_session_on_expiry() {
    let server = start("player_paused.json").await;
    let mut config = config(&server);
    config.polling.session = Duration::from_millis(100);

    let poller = Poller::new(&config);
    let res = tokio::time::timeout(Duration::from_millis(550), poller.run()).await;
    assert!(res.is_err(), "run should never return");

    // every session lasts at least its full duration and asks for exactly one token
    let tokens = server.received("POST", MockServer::TOKEN).await;
    assert!((2..=6).contains(&tokens.len()), "{tokens:?}");
    assert!(tokens
        .iter()
        .all(|body| body == "grant_type=refresh_token&refresh_token=the_refresh_token"));
    assert!(server.received("GET", MockServer::PLAYER).await.len() >= tokens.len());
}

#[tokio::test]
async fn rejected_token_ends_session() {
    let server = MockServer::start().await;
    server
        .mock_token(&read_input_data("token_rejected.json").await)
        .await;
    server
        .mock_player(json(200, &read_input_data("player_track.json").await))
        .await;

    let err = Poller::new(&config(&server)).run_session().await.unwrap_err();
    assert!(err.is_fatal(), "{err}");
    assert!(server.received("GET", MockServer::PLAYER).await.is_empty());
}

#[tokio::test]
async fn run_can_exit_on_auth_failure() {
    let server = MockServer::start().await;
    server
        .mock_token(&read_input_data("token_rejected.json").await)
        .await;

    let mut config = config(&server);
    config.polling.exit_on_auth_failure = true;

    let err = Poller::new(&config).run().await.unwrap_err();
    insta::assert_display_snapshot!(err, @"cannot get an access token");
    assert_eq!(server.received("POST", MockServer::TOKEN).await.len(), 1);
}

#[tokio::test]
async fn run_restarts_failed_sessions() {
    let server = MockServer::start().await;
    server
        .mock_token(&read_input_data("token_rejected.json").await)
        .await;

    let poller = Poller::new(&config(&server));
    let res = tokio::time::timeout(Duration::from_millis(500), poller.run()).await;
    assert!(res.is_err(), "run should never return");
    assert!(server.received("POST", MockServer::TOKEN).await.len() > 1);
}

#[test]
fn session_length_follows_the_token() {
    let config = Config {
        spotify: config::Spotify {
            client_id: "some_id".into(),
            client_secret: Secret("some_secret".into()),
            refresh_token: Secret("the_refresh_token".into()),
            token_url: config::TOKEN_URL.into(),
            player_url: config::PLAYER_URL.into(),
        },
        ntfy: config::Ntfy {
            url: "https://ntfy.sh/topic".into(),
        },
        polling: Polling {
            interval: Duration::from_secs(30),
            session: Duration::from_secs(60 * 60),
            http_timeout: Duration::from_secs(30),
            restart_delay: Duration::from_secs(30),
            exit_on_auth_failure: false,
            skip_unrecognized: false,
        },
    };
    let poller = Poller::new(&config);

    let secs = |n| AccessToken::new("token", Duration::from_secs(n));
    assert_eq!(poller.session_length(&secs(0)), Duration::from_secs(3600));
    assert_eq!(poller.session_length(&secs(3600)), Duration::from_secs(3540));
    assert_eq!(poller.session_length(&secs(7200)), Duration::from_secs(3600));
    assert_eq!(poller.session_length(&secs(30)), Duration::from_secs(30));
}
