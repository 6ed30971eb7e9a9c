use crate::{error::Error, http::Client};

/// Pushes plain text to an ntfy-style topic.
///
/// Delivery is best-effort: nothing is retried and a successful return only
/// means the sink accepted the request, not that anyone saw it.
#[derive(Clone)]
pub struct Notifier {
    agent: Client,
    url: String,
}

impl Notifier {
    pub fn new(agent: Client, url: impl ToString) -> Self {
        Self {
            agent,
            url: url.to_string(),
        }
    }

    pub async fn send(&self, message: &str) -> Result<(), Error> {
        self.agent.post_text(&self.url, message).await
    }
}
