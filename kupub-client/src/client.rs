//! Client facade
//!
//! [`KupubClient`] wires one configuration, one storage backend and one
//! authenticated HTTP transport into every API, store and background worker
//! of the crate.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::api::{AdminApi, AuthApi, PlatformApi, PublicApi};
use crate::auth::AuthStore;
use crate::cart::CartStore;
use crate::http::NetworkHttpClient;
use crate::onboarding::OnboardingFlag;
use crate::payment_watch::PaymentWatcher;
use crate::realtime::{Connector, RealtimeEvent, RealtimeHandle, WsConnector};
use crate::reconcile::{Reconciler, Snapshot};
use crate::session_store::SessionStore;
use crate::storage::{FileStore, MemoryStore, SharedStore};
use crate::{ClientConfig, ClientResult};

/// Builder for [`KupubClient`].
///
/// # Example
///
/// ```no_run
/// use kupub_client::{ClientConfig, KupubClient};
///
/// let client = KupubClient::builder()
///     .config(ClientConfig::new("https://api.kupub.kr"))
///     .storage_dir("./kupub-data")
///     .build()?;
/// let cart = client.cart("cs");
/// # Ok::<(), kupub_client::ClientError>(())
/// ```
#[derive(Default)]
pub struct KupubClientBuilder {
    config: Option<ClientConfig>,
    storage: Option<SharedStore>,
    storage_dir: Option<PathBuf>,
    connector: Option<Arc<dyn Connector>>,
}

impl KupubClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults to [`ClientConfig::from_env`]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing storage backend; wins over [`storage_dir`](Self::storage_dir)
    pub fn storage(mut self, storage: SharedStore) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Persist client state as files under `dir`
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    /// Realtime transport; defaults to [`WsConnector`]
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Without storage configured, state lives in memory only.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, the storage directory cannot
    /// be created or the HTTP client cannot be built.
    pub fn build(self) -> ClientResult<KupubClient> {
        let config = self.config.unwrap_or_else(ClientConfig::from_env);
        config.validate()?;

        let storage: SharedStore = match (self.storage, self.storage_dir) {
            (Some(storage), _) => storage,
            (None, Some(dir)) => Arc::new(FileStore::open(&dir)?),
            (None, None) => Arc::new(MemoryStore::new()),
        };

        let auth = AuthStore::new(storage.clone());
        let http = NetworkHttpClient::new(&config, auth.clone())?;
        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(WsConnector::new()));

        tracing::info!(
            base_url = %config.base_url,
            ws_url = %config.websocket_endpoint(),
            "KUPUB client ready"
        );

        Ok(KupubClient {
            config,
            storage,
            auth,
            http,
            connector,
        })
    }
}

/// Entry point of the SDK
#[derive(Clone)]
pub struct KupubClient {
    config: ClientConfig,
    storage: SharedStore,
    auth: AuthStore,
    http: NetworkHttpClient,
    connector: Arc<dyn Connector>,
}

impl KupubClient {
    pub fn builder() -> KupubClientBuilder {
        KupubClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn storage(&self) -> &SharedStore {
        &self.storage
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn http(&self) -> &NetworkHttpClient {
        &self.http
    }

    // ========== REST ==========

    pub fn public(&self, dept: &str) -> PublicApi {
        PublicApi::new(self.http.clone(), dept)
    }

    pub fn admin(&self, dept: &str) -> AdminApi {
        AdminApi::new(self.http.clone(), dept)
    }

    pub fn auth_api(&self) -> AuthApi {
        AuthApi::new(self.http.clone(), self.auth.clone())
    }

    pub fn platform(&self) -> PlatformApi {
        PlatformApi::new(self.http.clone())
    }

    // ========== Stores ==========

    pub fn cart(&self, dept: &str) -> CartStore {
        CartStore::open(self.storage.clone(), dept)
    }

    pub fn session(&self, dept: &str) -> SessionStore {
        SessionStore::open(self.storage.clone(), dept)
    }

    pub fn onboarding(&self) -> OnboardingFlag {
        OnboardingFlag::new(self.storage.clone())
    }

    // ========== Realtime ==========

    pub fn department_feed(&self, dept: &str) -> RealtimeHandle {
        RealtimeHandle::department(&self.config, self.connector.clone(), dept)
    }

    pub fn kitchen_feed(&self, dept: &str) -> RealtimeHandle {
        RealtimeHandle::kitchen(&self.config, self.connector.clone(), dept)
    }

    pub fn order_feed(&self, order_id: i64) -> RealtimeHandle {
        RealtimeHandle::order(&self.config, self.connector.clone(), order_id)
    }

    /// Keep an admin snapshot of `dept` fresh, re-fetching on `events` and
    /// every poll interval
    pub fn reconcile(
        &self,
        dept: &str,
        events: Option<broadcast::Receiver<RealtimeEvent>>,
    ) -> watch::Receiver<Arc<Snapshot>> {
        Reconciler::spawn(Arc::new(self.admin(dept)), events, self.config.poll_interval)
    }

    pub fn payment_watcher(&self, dept: &str) -> PaymentWatcher<PublicApi> {
        PaymentWatcher::new(self.public(dept), self.config.payment_poll_interval)
    }
}

impl std::fmt::Debug for KupubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KupubClient")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.auth.is_authenticated())
            .finish()
    }
}
