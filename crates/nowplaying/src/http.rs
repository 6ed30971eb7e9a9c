use std::{sync::Arc, time::Duration};

use crate::error::Error;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct Client(Arc<ureq::Agent>);

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self::with(|builder| builder.user_agent(USER_AGENT))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with(|builder| builder.user_agent(USER_AGENT).timeout(timeout))
    }

    pub fn with(f: impl Fn(ureq::AgentBuilder) -> ureq::AgentBuilder) -> Self {
        let builder = ureq::AgentBuilder::new();
        Self(Arc::new(f(builder).build()))
    }

    /// GET some json. Anything but a 200 is an [`Error::Status`]
    pub async fn get_json<'qk, 'qv, 'hk, 'hv, T, Q, H>(
        &self,
        ep: &str,
        query: Q,
        headers: H,
    ) -> Result<T, Error>
    where
        for<'de> T: serde::Deserialize<'de> + Send + 'static,
        Q: IntoIterator<Item = (&'qk str, &'qv str)>,
        H: IntoIterator<Item = (&'hk str, &'hv str)>,
    {
        let req = Self::build(ep, query, headers, |ep| self.0.get(ep));
        Self::call(move || {
            let resp = req.call().map_err(Self::status_or_transport)?;
            match resp.status() {
                200 => Self::into_json(resp),
                code => Err(Error::Status(code)),
            }
        })
        .await
    }

    /// POST a form, decoding the body as json even for an error status.
    ///
    /// Token endpoints describe their failures in the body, so the caller gets to look at it.
    pub async fn post_form<'hk, 'hv, T, H>(
        &self,
        ep: &str,
        form: &[(&str, &str)],
        headers: H,
    ) -> Result<T, Error>
    where
        for<'de> T: serde::Deserialize<'de> + Send + 'static,
        H: IntoIterator<Item = (&'hk str, &'hv str)>,
    {
        let req = Self::build(ep, std::iter::empty(), headers, |ep| self.0.post(ep));
        let form = form
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>();

        Self::call(move || {
            let form = form
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect::<Vec<_>>();

            match req.send_form(&form) {
                Ok(resp) | Err(ureq::Error::Status(_, resp)) => Self::into_json(resp),
                Err(ureq::Error::Transport(err)) => Err(err.into()),
            }
        })
        .await
    }

    /// POST a raw text body, only the status of the response is looked at
    pub async fn post_text(&self, ep: &str, body: &str) -> Result<(), Error> {
        let req = Self::build(ep, std::iter::empty(), std::iter::empty(), |ep| {
            self.0.post(ep)
        });
        let body = body.to_string();
        Self::call(move || {
            req.send_string(&body)
                .map(drop)
                .map_err(Self::status_or_transport)
        })
        .await
    }

    async fn call<T, F>(then: F) -> Result<T, Error>
    where
        F: FnOnce() -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(then)
            .await
            .map_err(|err| Error::transport(err.to_string()))?
    }

    fn into_json<T>(resp: ureq::Response) -> Result<T, Error>
    where
        for<'de> T: serde::Deserialize<'de>,
    {
        let body = resp.into_string().map_err(Error::transport)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn status_or_transport(err: ureq::Error) -> Error {
        match err {
            ureq::Error::Status(code, ..) => Error::Status(code),
            ureq::Error::Transport(err) => err.into(),
        }
    }

    fn build<'qk, 'qv, 'hk, 'hv, Q, H>(
        ep: &str,
        query: Q,
        headers: H,
        method: impl Fn(&str) -> ureq::Request,
    ) -> ureq::Request
    where
        Q: IntoIterator<Item = (&'qk str, &'qv str)>,
        H: IntoIterator<Item = (&'hk str, &'hv str)>,
    {
        let (q, s) = (ureq::Request::query, ureq::Request::set);
        let query_map = move |req, (key, val)| q(req, key, val);
        let set_map = move |req, (key, val)| s(req, key, val);
        let query = query.into_iter().fold(method(ep), query_map);
        headers.into_iter().fold(query, set_map)
    }
}
