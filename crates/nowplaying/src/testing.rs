use std::path::PathBuf;

use wiremock::{
    matchers::{method, path},
    Mock, MockBuilder, ResponseTemplate,
};

pub fn fixtures_dir() -> PathBuf {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

pub async fn read_input_data(name: &str) -> String {
    tokio::fs::read_to_string(fixtures_dir().join(name))
        .await
        .unwrap()
}

pub fn json(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .set_body_string(body)
        .append_header("content-type", "application/json")
}

pub struct MockServer(wiremock::MockServer, String);

impl MockServer {
    pub const TOKEN: &'static str = "/api/token";
    pub const PLAYER: &'static str = "/v1/me/player";
    pub const NTFY: &'static str = "/topic";

    pub async fn start() -> Self {
        let server = wiremock::MockServer::start().await;
        let address = server.address().to_string();
        Self(server, format!("http://{address}"))
    }

    pub fn address(&self) -> &str {
        let Self(.., addr) = self;
        addr
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address())
    }

    pub async fn mock_get(map: fn(MockBuilder) -> MockBuilder, response: &str) -> Self {
        let server = Self::start().await;
        server
            .register(map(Mock::given(method("GET"))).respond_with(json(200, response)))
            .await;
        server
    }

    pub async fn mock_post(
        map: fn(MockBuilder) -> MockBuilder,
        status: u16,
        response: &str,
    ) -> Self {
        let server = Self::start().await;
        server
            .register(map(Mock::given(method("POST"))).respond_with(json(status, response)))
            .await;
        server
    }

    pub async fn register(&self, mock: Mock) {
        self.0.register(mock).await
    }

    pub async fn mock_token(&self, response: &str) {
        self.register(
            Mock::given(method("POST"))
                .and(path(Self::TOKEN))
                .respond_with(json(200, response)),
        )
        .await
    }

    pub async fn mock_player(&self, response: ResponseTemplate) {
        self.register(
            Mock::given(method("GET"))
                .and(path(Self::PLAYER))
                .respond_with(response),
        )
        .await
    }

    pub async fn mock_ntfy(&self) {
        self.register(
            Mock::given(method("POST"))
                .and(path(Self::NTFY))
                .respond_with(ResponseTemplate::new(200)),
        )
        .await
    }

    /// Bodies of every request made to `path` with `method`, in order
    pub async fn received(&self, method: &str, path: &str) -> Vec<String> {
        self.0
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|req| req.method.to_string() == method && req.url.path() == path)
            .map(|req| String::from_utf8_lossy(&req.body).into_owned())
            .collect()
    }
}
