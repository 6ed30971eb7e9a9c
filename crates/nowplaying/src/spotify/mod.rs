pub mod data;
pub use data::{ContentType, NowPlaying, Playback};

mod client;
pub use client::SpotifyClient;

pub mod oauth;
pub use oauth::{AccessToken, Credentials, OAuth};
