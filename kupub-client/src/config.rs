//! Client configuration

use std::time::Duration;

use reqwest::Url;

use crate::{ClientError, ClientResult};

/// Shortest accepted poll interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Realtime channel reconnect policy
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Delay before the first reconnect attempt
    pub initial_delay: Duration,
    /// Upper bound of the reconnect delay
    pub max_delay: Duration,
    /// Delay growth factor per consecutive failure
    pub multiplier: u32,
    /// Consecutive failures before the channel gives up (0 = never)
    pub max_attempts: u32,
    /// Time allowed for the socket plus STOMP handshake
    pub connect_timeout: Duration,
    /// Heart-beat interval announced in CONNECT
    pub heartbeat: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
            multiplier: 2,
            max_attempts: 10,
            connect_timeout: Duration::from_secs(10),
            heartbeat: Duration::from_secs(10),
        }
    }
}

impl RealtimeConfig {
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier.max(1);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Client configuration for connecting to the KUPUB backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "http://localhost:8080"); empty means same origin
    pub base_url: String,

    /// Explicit WebSocket endpoint, overrides derivation from `base_url`
    pub ws_url: Option<String>,

    /// Request timeout
    pub timeout: Duration,

    /// Backstop re-fetch interval for admin and kitchen views
    pub poll_interval: Duration,

    /// Payment status polling interval on the waiting screen
    pub payment_poll_interval: Duration,

    pub realtime: RealtimeConfig,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ws_url: None,
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(30),
            payment_poll_interval: Duration::from_secs(10),
            realtime: RealtimeConfig::default(),
        }
    }

    /// Load from `KUPUB_*` environment variables (after `.env`).
    ///
    /// Unparsable or zero values fall back to defaults.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let mut config = Self::new(std::env::var("KUPUB_API_URL").unwrap_or_default());
        config.ws_url = std::env::var("KUPUB_WS_URL").ok().filter(|v| !v.is_empty());
        if let Some(secs) = env_secs("KUPUB_TIMEOUT_SECS") {
            config.timeout = secs;
        }
        if let Some(secs) = env_secs("KUPUB_POLL_INTERVAL_SECS") {
            config.poll_interval = secs;
        }
        if let Some(secs) = env_secs("KUPUB_PAYMENT_POLL_SECS") {
            config.payment_poll_interval = secs;
        }
        config
    }

    pub fn with_ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Clamped to [`MIN_POLL_INTERVAL`]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Clamped to [`MIN_POLL_INTERVAL`]
    pub fn with_payment_poll_interval(mut self, interval: Duration) -> Self {
        self.payment_poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn with_realtime(mut self, realtime: RealtimeConfig) -> Self {
        self.realtime = realtime;
        self
    }

    /// Reject settings the background workers cannot run with
    pub fn validate(&self) -> ClientResult<()> {
        if self.poll_interval < MIN_POLL_INTERVAL {
            return Err(ClientError::Config(format!(
                "poll_interval must be at least {MIN_POLL_INTERVAL:?}, got {:?}",
                self.poll_interval
            )));
        }
        if self.payment_poll_interval < MIN_POLL_INTERVAL {
            return Err(ClientError::Config(format!(
                "payment_poll_interval must be at least {MIN_POLL_INTERVAL:?}, got {:?}",
                self.payment_poll_interval
            )));
        }
        Ok(())
    }

    /// WebSocket endpoint of the STOMP broker.
    ///
    /// Explicit `ws_url` wins; otherwise the API origin with a `ws`/`wss`
    /// scheme and `/ws` path; otherwise `ws://localhost/ws`.
    pub fn websocket_endpoint(&self) -> String {
        if let Some(url) = self.ws_url.as_deref().filter(|u| !u.is_empty()) {
            return url.to_string();
        }

        match Url::parse(&self.base_url) {
            Ok(mut url) => {
                let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
                if url.set_scheme(scheme).is_err() {
                    return "ws://localhost/ws".to_string();
                }
                url.set_path("/ws");
                url.set_query(None);
                url.set_fragment(None);
                url.to_string()
            }
            Err(_) => "ws://localhost/ws".to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key).ok().as_deref().and_then(parse_secs)
}

/// Whole seconds; zero counts as unset
fn parse_secs(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
}
