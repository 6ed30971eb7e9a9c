use std::{
    fmt::{Debug, Display},
    ops::Deref,
    time::Duration,
};

macro_rules! make_key {
    (@one $key:ident) => {
        pub const $key: &str = stringify!($key);
    };
    ($($key:ident)*) => {
        $(make_key!(@one $key);)*
    }
}

make_key! {
    // spotify api
    CLIENT_ID
    CLIENT_SECRET
    REFRESH_TOKEN
    SPOTIFY_TOKEN_URL
    SPOTIFY_PLAYER_URL
    // notification sink
    NTFY_URL
    // tuning
    NOWPLAYING_POLL_INTERVAL
    NOWPLAYING_SESSION_DURATION
    NOWPLAYING_HTTP_TIMEOUT
    NOWPLAYING_RESTART_DELAY
    NOWPLAYING_EXIT_ON_AUTH_FAILURE
    NOWPLAYING_SKIP_UNRECOGNIZED
}

pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const PLAYER_URL: &str = "https://api.spotify.com/v1/me/player";

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify: Spotify,
    pub ntfy: Ntfy,
    pub polling: Polling,
}

impl Config {
    pub fn load_from_env() -> anyhow::Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get_var = |key: &str| {
            lookup(key)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| anyhow::anyhow!("env var `{key}` must be set"))
        };
        let get_var_or = |key: &str, def: &str| lookup(key).unwrap_or_else(|| def.to_string());

        let duration = |key: &str, def: &str| {
            let val = get_var_or(key, def);
            anyhow::Context::with_context(humantime::parse_duration(&val), || {
                format!("env var `{key}` is not a valid duration: {val:?}")
            })
        };

        let flag = |key: &str| match lookup(key).as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") | Some("no") => Ok(false),
            Some("1") | Some("true") | Some("yes") => Ok(true),
            Some(val) => Err(anyhow::anyhow!(
                "env var `{key}` must be a boolean, got {val:?}"
            )),
        };

        let polling = Polling {
            interval: duration(NOWPLAYING_POLL_INTERVAL, "30s")?,
            session: duration(NOWPLAYING_SESSION_DURATION, "1h")?,
            http_timeout: duration(NOWPLAYING_HTTP_TIMEOUT, "30s")?,
            restart_delay: duration(NOWPLAYING_RESTART_DELAY, "30s")?,
            exit_on_auth_failure: flag(NOWPLAYING_EXIT_ON_AUTH_FAILURE)?,
            skip_unrecognized: flag(NOWPLAYING_SKIP_UNRECOGNIZED)?,
        };
        anyhow::ensure!(
            !polling.interval.is_zero(),
            "env var `{NOWPLAYING_POLL_INTERVAL}` cannot be zero"
        );

        Ok(Self {
            spotify: Spotify {
                client_id: get_var(CLIENT_ID)?,
                client_secret: get_var(CLIENT_SECRET).map(Secret)?,
                refresh_token: get_var(REFRESH_TOKEN).map(Secret)?,
                token_url: get_var_or(SPOTIFY_TOKEN_URL, TOKEN_URL),
                player_url: get_var_or(SPOTIFY_PLAYER_URL, PLAYER_URL),
            },
            ntfy: Ntfy {
                url: get_var(NTFY_URL)?,
            },
            polling,
        })
    }
}

#[derive(Clone)]
pub struct Spotify {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub refresh_token: Secret<String>,
    pub token_url: String,
    pub player_url: String,
}

impl Debug for Spotify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spotify")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret)
            .field("refresh_token", &self.refresh_token)
            .field("token_url", &self.token_url)
            .field("player_url", &self.player_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Ntfy {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Polling {
    pub interval: Duration,
    pub session: Duration,
    pub http_timeout: Duration,
    pub restart_delay: Duration,
    pub exit_on_auth_failure: bool,
    pub skip_unrecognized: bool,
}

pub trait Redacted {
    fn redact(&self) -> String;
}

impl Redacted for str {
    fn redact(&self) -> String {
        self.chars().map(|_| 'x').collect()
    }
}

impl Redacted for String {
    fn redact(&self) -> String {
        self.as_str().redact()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Secret<T>(pub T);

impl<T: Deref<Target = str>> Deref for Secret<T> {
    type Target = T::Target;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Redacted> Debug for Secret<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.redact())
    }
}

impl<T: Redacted> Display for Secret<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.redact())
    }
}
