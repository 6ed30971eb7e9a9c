use std::time::Duration;

#[derive(Clone, Debug, Default, ::serde::Deserialize)]
pub struct Playback {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub currently_playing_type: ContentType,
    // an episode when asked for with `additional_types=episode`
    #[serde(default)]
    pub item: Option<Item>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ::serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Track,
    Episode,
    // ads, and whatever else spotify decides to send
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Default, ::serde::Deserialize)]
pub struct Item {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    // tracks only
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Option<Album>,
    // episodes only
    #[serde(default)]
    pub show: Option<Show>,
}

#[derive(Clone, Debug, ::serde::Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Clone, Debug, ::serde::Deserialize)]
pub struct Album {
    pub name: String,
    #[serde(default)]
    pub total_tracks: u32,
}

#[derive(Clone, Debug, ::serde::Deserialize)]
pub struct Show {
    pub name: String,
    #[serde(default)]
    pub publisher: String,
}

impl Playback {
    pub fn progress(&self) -> Option<Duration> {
        self.progress_ms.map(Duration::from_millis)
    }

    /// What to announce, if anything is actually playing
    pub fn now_playing(&self) -> Option<NowPlaying<'_>> {
        if !self.is_playing {
            return None;
        }

        let item = self.item.as_ref();
        let name = item.map(|item| &*item.name).unwrap_or_default();

        let playing = match (self.currently_playing_type, item) {
            (ContentType::Track, Some(item)) => NowPlaying::Track {
                artist: item.artists.first().map(|a| &*a.name).unwrap_or_default(),
                name,
                // singles don't get an album
                album: item
                    .album
                    .as_ref()
                    .filter(|album| album.total_tracks > 1)
                    .map(|album| &*album.name),
            },
            (ContentType::Episode, item) => NowPlaying::Episode {
                show: item
                    .and_then(|item| item.show.as_ref())
                    .map(|show| &*show.name)
                    .unwrap_or_default(),
                name,
            },
            _ => NowPlaying::Unrecognized,
        };
        Some(playing)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NowPlaying<'a> {
    Track {
        artist: &'a str,
        name: &'a str,
        album: Option<&'a str>,
    },
    Episode {
        show: &'a str,
        name: &'a str,
    },
    Unrecognized,
}

impl<'a> std::fmt::Display for NowPlaying<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Track {
                artist,
                name,
                album: Some(album),
            } => write!(f, "Now Playing: {artist} - {name} (in {album})"),
            Self::Track { artist, name, .. } => write!(f, "Now Playing: {artist} - {name}"),
            Self::Episode { show, name } => write!(
                f,
                "You are now listening to: 102.3, REAL {show} FM, where we play NOTHING but {name}"
            ),
            Self::Unrecognized => Ok(()),
        }
    }
}
