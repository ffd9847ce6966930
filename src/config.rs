use crate::error::Error;
use serde_json::Value;
use url::Url;

/// Where socket.io servers mount the engine by default.
pub const DEFAULT_PATH: &str = "/socket.io/";

/// Engine.IO protocol revision spoken by this client.
pub const ENGINE_PROTOCOL: &str = "4";

/// Connection settings for a [`Client`](crate::Client).
///
/// The transport is always a websocket; there is no long-polling
/// fallback.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    url: Url,
    path: String,
    auth: Option<Value>,
}

impl ClientConfig {
    pub fn new(url: &str) -> Result<Self, Error> {
        let config = ClientConfig {
            url: Url::parse(url)?,
            path: DEFAULT_PATH.to_owned(),
            auth: None,
        };
        config.websocket_url()?;
        Ok(config)
    }

    /// Engine path, used only when the url itself has none.
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_owned();
        self
    }

    /// Payload sent with the namespace connect packet.
    pub fn auth(mut self, auth: Value) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn auth_payload(&self) -> Option<&Value> {
        self.auth.as_ref()
    }

    pub fn websocket_url(&self) -> Result<Url, Error> {
        let mut url = self.url.clone();
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(Error::InvalidUrl(format!(
                    "unsupported scheme {}",
                    other
                )))
            }
        };
        url.set_scheme(scheme)
            .map_err(|_| Error::InvalidUrl(format!("cannot switch {} to {}", self.url, scheme)))?;
        if url.path().is_empty() || url.path() == "/" {
            url.set_path(&self.path);
        }
        url.query_pairs_mut()
            .append_pair("EIO", ENGINE_PROTOCOL)
            .append_pair("transport", "websocket");
        Ok(url)
    }
}
