type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum Error {
    /// The request never completed: dns, connect, tls or a timeout
    Transport(BoxError),
    /// The body wasn't the json we expected
    Decode(BoxError),
    /// The token endpoint answered, but without an access token
    NoToken,
    /// Anything other than a 200 from the player endpoint
    Status(u16),
}

impl Error {
    pub(crate) fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    pub(crate) fn decode(err: impl Into<BoxError>) -> Self {
        Self::Decode(err.into())
    }

    /// A rejected credential is fatal wherever it shows up
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::NoToken)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "transport error: {err}"),
            Self::Decode(err) => write!(f, "cannot decode response: {err}"),
            Self::NoToken => f.write_str("no access token returned"),
            Self::Status(code) => write!(f, "expected HTTP 200, got HTTP {code}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) | Self::Decode(err) => Some(&**err),
            Self::NoToken | Self::Status(..) => None,
        }
    }
}

impl From<ureq::Transport> for Error {
    fn from(err: ureq::Transport) -> Self {
        Self::transport(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err)
    }
}
