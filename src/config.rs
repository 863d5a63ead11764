//! client configuration
//!
//! build a [`ClientConfig`] with the graphql endpoint and optional
//! overrides, then pass it to [`crate::Client::new`].

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use url::Url;

/// configuration for the runtime graphql client
#[derive(Clone)]
pub struct ClientConfig {
    /// original endpoint input
    pub(crate) raw_endpoint: String,

    /// parsed endpoint, if the input was a valid url
    pub(crate) endpoint: Option<Url>,

    /// per-request timeout
    pub(crate) timeout: Duration,

    /// `user-agent` header value
    pub(crate) user_agent: String,

    /// verify tls certificates
    pub(crate) verify_ssl: bool,

    /// headers attached to every request, on top of the defaults
    pub(crate) extra_headers: HeaderMap,

    /// prebuilt http client, used as-is when set
    pub(crate) http_client: Option<reqwest::Client>,
}

impl ClientConfig {
    /// create a configuration for a graphql endpoint
    ///
    /// ```
    /// use gqlclientgen::ClientConfig;
    ///
    /// let config = ClientConfig::new("https://countries.trevorblades.com/graphql");
    /// ```
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        let raw = endpoint.as_ref().trim();
        let endpoint = Url::parse(raw)
            .or_else(|_| Url::parse(&format!("https://{raw}")))
            .ok();

        Self {
            raw_endpoint: raw.to_string(),
            endpoint,
            timeout: Duration::from_secs(30),
            user_agent: format!("gqlclientgen/{} (Rust)", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            extra_headers: HeaderMap::new(),
            http_client: None,
        }
    }

    /// override the 30 second request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// override the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// turn tls certificate verification on or off
    pub fn with_ssl_verification(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// send `name: value` with every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.extra_headers.insert(name, value);
        self
    }

    /// add string headers, as read from configuration files
    pub fn with_raw_headers<'a, I>(mut self, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| Error::Config(format!("invalid header name {name}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| Error::Config(format!("invalid value for header {name}: {err}")))?;
            self.extra_headers.insert(name, value);
        }
        Ok(self)
    }

    /// headers added with [`Self::with_header`] and friends
    pub fn extra_headers(&self) -> &HeaderMap {
        &self.extra_headers
    }

    /// use this http client instead of building one.
    ///
    /// when set, transport settings on this config (headers, timeout,
    /// user agent, ssl verification) are ignored.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// validate the configuration and return the endpoint
    pub(crate) fn validate(&self) -> Result<&Url> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or_else(|| Error::Config(format!("invalid endpoint: {}", self.raw_endpoint)))?;

        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(Error::Config(format!(
                "endpoint scheme {} is not http or https",
                endpoint.scheme()
            )));
        }

        Ok(endpoint)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.raw_endpoint)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("verify_ssl", &self.verify_ssl)
            .field("extra_headers", &self.extra_headers.len())
            .field("http_client", &self.http_client.is_some())
            .finish()
    }
}
