use std::{
    collections::VecDeque,
    io::{BufRead, Write},
};

use anyhow::Context as _;

use crate::{
    config::Secret,
    http::Client,
    spotify::{Credentials, OAuth},
};

/// Reads whitespace separated answers, so values containing whitespace aren't supported
pub struct Prompt<R, W> {
    reader: R,
    writer: W,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            pending: VecDeque::new(),
        }
    }

    pub fn say(&mut self, msg: impl std::fmt::Display) -> anyhow::Result<()> {
        writeln!(self.writer, "{msg}")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn next_token(&mut self) -> anyhow::Result<String> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }

            let mut line = String::new();
            let n = self.reader.read_line(&mut line)?;
            anyhow::ensure!(n > 0, "unexpected end of input");
            self.pending
                .extend(line.split_whitespace().map(ToString::to_string));
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// Walks the operator through the authorization code flow, returning the refresh token.
///
/// `token_url` overrides the token endpoint.
pub async fn authorize<R, W>(
    prompt: &mut Prompt<R, W>,
    token_url: Option<String>,
) -> anyhow::Result<Secret<String>>
where
    R: BufRead,
    W: Write,
{
    prompt.say("Please input the client ID, then the client Secret, then the app's redirect URI.")?;
    let client_id = prompt.next_token().context("cannot read the client id")?;
    let client_secret = prompt.next_token().context("cannot read the client secret")?;
    let redirect_uri = prompt.next_token().context("cannot read the redirect uri")?;

    let url = OAuth::authorize_url(&client_id, &redirect_uri)?;
    prompt.say(format_args!("Authentication URL: {url}"))?;
    prompt.say("Please input the obtained authcode when being redirected:")?;

    let code = prompt.next_token().context("cannot read the auth code")?;
    let code = extract_code(&code);

    log::debug!("exchanging the auth code for a refresh token");
    let oauth = OAuth::new_with_ep(
        token_url,
        Client::new(),
        Credentials::new(&client_id, &client_secret),
    );
    oauth
        .exchange_code(&code, &redirect_uri)
        .await
        .context("cannot exchange the auth code")
}

// people tend to paste the whole redirect
fn extract_code(input: &str) -> String {
    url::Url::parse(input)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find_map(|(k, v)| (k == "code").then(|| v.into_owned()))
        })
        .unwrap_or_else(|| input.to_string())
}
