use std::time::Duration;

use base64::Engine as _;

use crate::{config::Secret, error::Error, http::Client};

pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const SCOPES: [&str; 2] = ["user-read-currently-playing", "user-read-playback-state"];

#[derive(::serde::Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
}

impl Credentials {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: Secret(client_secret.to_string()),
        }
    }

    pub fn basic_auth(&self) -> String {
        let pair = format!("{}:{}", self.client_id, &*self.client_secret);
        let encoded = base64::engine::general_purpose::STANDARD.encode(pair);
        format!("Basic {encoded}")
    }
}

/// A short-lived bearer token, only ever kept in memory
#[derive(Clone, Debug)]
pub struct AccessToken {
    token: Secret<String>,
    expires_in: Duration,
}

impl AccessToken {
    pub fn new(token: impl ToString, expires_in: Duration) -> Self {
        Self {
            token: Secret(token.to_string()),
            expires_in,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", &*self.token)
    }

    /// The lifetime hint from the token endpoint, zero if it didn't give one
    pub const fn expires_in(&self) -> Duration {
        self.expires_in
    }
}

#[derive(Clone)]
pub struct OAuth {
    agent: Client,
    credentials: Credentials,
    base: Option<String>,
}

impl OAuth {
    pub fn new(agent: Client, credentials: Credentials) -> Self {
        Self::new_with_ep(Option::<String>::None, agent, credentials)
    }

    pub fn new_with_ep(
        ep: impl Into<Option<String>>,
        agent: Client,
        credentials: Credentials,
    ) -> Self {
        Self {
            agent,
            credentials,
            base: ep.into(),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Trade the long-lived refresh token for an access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, Error> {
        let resp = self
            .request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        Ok(AccessToken::new(
            resp.access_token,
            Duration::from_secs(resp.expires_in),
        ))
    }

    /// Trade an authorization code for a refresh token
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Secret<String>, Error> {
        let resp = self
            .request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .await?;

        resp.refresh_token
            .filter(|s| !s.is_empty())
            .map(Secret)
            .ok_or(Error::NoToken)
    }

    async fn request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, Error> {
        let ep = self.base.as_deref().unwrap_or(crate::config::TOKEN_URL);
        let auth = self.credentials.basic_auth();
        let resp: TokenResponse = self
            .agent
            .post_form(ep, form, [("authorization", &*auth)])
            .await?;

        if resp.access_token.is_empty() {
            return Err(Error::NoToken);
        }
        Ok(resp)
    }

    /// Where the operator has to go to grant access to their playback state
    pub fn authorize_url(client_id: &str, redirect_uri: &str) -> anyhow::Result<url::Url> {
        let mut url = url::Url::parse(AUTHORIZE_URL)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri);
        Ok(url)
    }
}
