use std::time::Duration;

use tokio::time::Instant;

use crate::{
    config::{Config, Polling, Secret},
    error::Error,
    http::Client,
    ntfy::Notifier,
    spotify::{AccessToken, Credentials, NowPlaying, OAuth, SpotifyClient},
};

/// Tallies for a single session, mostly so there is something to log
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub polls: usize,
    pub dispatched: usize,
    pub idle: usize,
    pub failed: usize,
}

impl SessionReport {
    fn record(&mut self, tick: Tick) {
        self.polls += 1;
        match tick {
            Tick::Dispatched => self.dispatched += 1,
            Tick::Idle => self.idle += 1,
            Tick::Failed => self.failed += 1,
        }
    }
}

impl std::fmt::Display for SessionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            polls,
            dispatched,
            idle,
            failed,
        } = self;
        write!(
            f,
            "{polls} polls: {dispatched} dispatched, {idle} idle, {failed} failed"
        )
    }
}

enum Tick {
    Dispatched,
    Idle,
    Failed,
}

pub struct Poller {
    oauth: OAuth,
    spotify: SpotifyClient,
    notifier: Notifier,
    refresh_token: Secret<String>,
    polling: Polling,
}

impl Poller {
    // stop using a token a bit before spotify does
    const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

    pub fn new(config: &Config) -> Self {
        let agent = Client::with_timeout(config.polling.http_timeout);
        let credentials = Credentials {
            client_id: config.spotify.client_id.clone(),
            client_secret: config.spotify.client_secret.clone(),
        };

        Self {
            oauth: OAuth::new_with_ep(
                config.spotify.token_url.clone(),
                agent.clone(),
                credentials,
            ),
            spotify: SpotifyClient::new_with_ep(config.spotify.player_url.clone(), agent.clone()),
            notifier: Notifier::new(agent, &config.ntfy.url),
            refresh_token: config.spotify.refresh_token.clone(),
            polling: config.polling.clone(),
        }
    }

    /// Runs sessions back to back, forever.
    ///
    /// A session that cannot get a token is retried after the restart delay,
    /// unless the poller was configured to give up instead.
    pub async fn run(&self) -> anyhow::Result<()> {
        loop {
            match self.run_session().await {
                Ok(report) => log::info!("session ended after {report}"),

                Err(err) if self.polling.exit_on_auth_failure => {
                    return Err(anyhow::Error::new(err).context("cannot get an access token"))
                }

                Err(err) => {
                    if err.is_fatal() {
                        log::error!("spotify rejected the credentials: {err}");
                    } else {
                        log::error!("cannot get an access token: {err}");
                    }
                    log::info!(
                        "starting a new session in {}",
                        humantime::format_duration(self.polling.restart_delay)
                    );
                    tokio::time::sleep(self.polling.restart_delay).await;
                }
            }
        }
    }

    /// Gets one token and polls with it until the session is over
    pub async fn run_session(&self) -> Result<SessionReport, Error> {
        let start = Instant::now();

        log::info!("getting a new token");
        let token = self.oauth.refresh(&self.refresh_token).await?;

        let length = self.session_length(&token);
        log::info!("session will last {}", humantime::format_duration(length));

        let deadline = start + length;
        let mut report = SessionReport::default();
        while Instant::now() < deadline {
            tokio::time::sleep(self.polling.interval).await;
            report.record(self.tick(&token).await);
        }

        Ok(report)
    }

    fn session_length(&self, token: &AccessToken) -> Duration {
        let lifetime = match token.expires_in() {
            d if d.is_zero() => return self.polling.session,
            d if d > Self::EXPIRY_MARGIN => d - Self::EXPIRY_MARGIN,
            d => d,
        };
        self.polling.session.min(lifetime)
    }

    async fn tick(&self, token: &AccessToken) -> Tick {
        let playback = match self.spotify.currently_playing(token).await {
            Ok(playback) => playback,
            Err(err) => {
                log::warn!("cannot get the player state: {err}");
                return Tick::Failed;
            }
        };

        let now_playing = match playback.now_playing() {
            Some(NowPlaying::Unrecognized) if self.polling.skip_unrecognized => {
                log::debug!(
                    "skipping unrecognized content: {:?}",
                    playback.currently_playing_type
                );
                return Tick::Idle;
            }
            Some(now_playing) => now_playing,
            None => {
                log::debug!("nothing is playing");
                return Tick::Idle;
            }
        };

        let message = now_playing.to_string();
        log::info!("{message}");
        if let Some(progress) = playback.progress() {
            log::debug!("{} in", humantime::format_duration(progress));
        }

        if let Err(err) = self.notifier.send(&message).await {
            log::warn!("cannot deliver the notification: {err}");
        }
        Tick::Dispatched
    }
}

#[cfg(test)]
mod tests;
