use crate::{error::Error, http::Client};

use super::{data::Playback, oauth::AccessToken};

#[derive(Clone)]
pub struct SpotifyClient {
    agent: Client,
    base: Option<String>,
}

impl SpotifyClient {
    pub fn new(agent: Client) -> Self {
        Self::new_with_ep(Option::<String>::None, agent)
    }

    pub fn new_with_ep(ep: impl Into<Option<String>>, agent: Client) -> Self {
        Self {
            agent,
            base: ep.into(),
        }
    }

    /// The player state, including podcast episodes
    pub async fn currently_playing(&self, token: &AccessToken) -> Result<Playback, Error> {
        let ep = self.base.as_deref().unwrap_or(crate::config::PLAYER_URL);
        let bearer = token.bearer();
        self.agent
            .get_json(
                ep,
                [("additional_types", "episode")],
                [("authorization", &*bearer)],
            )
            .await
    }
}
