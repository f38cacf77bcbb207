//! Customer session snapshot
//!
//! The active session of a department is fetched from the backend and kept
//! under `kupub_session_{dept}` so a reload lands back in the same visit.

use shared::models::{Session, SessionStartRequest};
use std::sync::{PoisonError, RwLock};

use crate::ClientResult;
use crate::api::PublicApi;
use crate::http::HttpClient;
use crate::storage::{KeyValueStore, SharedStore, StorageError, StorageEvent, StorageKey, TypedStorage};

#[derive(Debug)]
pub struct SessionStore {
    storage: SharedStore,
    dept: String,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn open(storage: SharedStore, dept: impl Into<String>) -> Self {
        let dept = dept.into();
        let current = storage.load::<Session>(&StorageKey::Session(&dept).as_key());
        Self {
            storage,
            dept,
            current: RwLock::new(current),
        }
    }

    pub fn dept(&self) -> &str {
        &self.dept
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start a new session and remember it
    pub async fn start<C: HttpClient>(
        &self,
        api: &PublicApi<C>,
        req: &SessionStartRequest,
    ) -> ClientResult<Session> {
        let session = api.start_session(req).await.inspect_err(|e| {
            tracing::warn!(dept = %self.dept, kind = ?req.session_type, error = %e, "Failed to start session");
        })?;
        self.store(session.clone())?;
        Ok(session)
    }

    /// Fetch a session by id and remember it
    pub async fn load<C: HttpClient>(&self, api: &PublicApi<C>, session_id: i64) -> ClientResult<Session> {
        let session = api.get_session(session_id).await.inspect_err(|e| {
            tracing::warn!(dept = %self.dept, session_id, error = %e, "Failed to load session");
        })?;
        self.store(session.clone())?;
        Ok(session)
    }

    /// Re-fetch the remembered session, if any
    pub async fn refresh<C: HttpClient>(&self, api: &PublicApi<C>) -> ClientResult<Option<Session>> {
        match self.current() {
            Some(session) => self.load(api, session.id).await.map(Some),
            None => Ok(None),
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.storage.remove(&self.key())
    }

    /// Re-read the persisted snapshot after an external change
    pub fn reload(&self) {
        let session = self.storage.load::<Session>(&self.key());
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    pub fn affected_by(&self, event: &StorageEvent) -> bool {
        event.key == self.key()
    }

    fn store(&self, session: Session) -> Result<(), StorageError> {
        self.storage.save(&self.key(), &session)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    fn key(&self) -> String {
        StorageKey::Session(&self.dept).as_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeHttp;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use shared::error::{ApiError, ErrorCode};
    use std::sync::Arc;

    fn session_json(id: i64) -> serde_json::Value {
        json!({
            "id": id, "departmentId": 1, "type": "CODE", "sessionCode": "X7Q2",
            "guestName": "kim", "people": 2, "status": "ACTIVE",
            "createdAt": "2024-05-01T19:00:00"
        })
    }

    #[tokio::test]
    async fn test_start_persists_session() {
        let http = FakeHttp::new();
        http.reply("POST", "/api/cs/sessions/start", session_json(5));
        let api = PublicApi::new(http.clone(), "cs");
        let storage: SharedStore = Arc::new(MemoryStore::new());

        let store = SessionStore::open(storage.clone(), "cs");
        let session = store
            .start(&api, &SessionStartRequest::code("X7Q2").with_guest("kim", 2))
            .await
            .unwrap();
        assert_eq!(session.id, 5);

        let reopened = SessionStore::open(storage, "cs");
        assert_eq!(reopened.current().map(|s| s.id), Some(5));
        assert_eq!(http.calls()[0].body.as_ref().unwrap()["type"], "CODE");
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous() {
        let http = FakeHttp::new();
        http.reply("GET", "/api/cs/sessions/5", session_json(5));
        http.fail(
            "GET",
            "/api/cs/sessions/6",
            ApiError::new(ErrorCode::NotFound, "세션을 찾을 수 없습니다."),
        );
        let api = PublicApi::new(http, "cs");
        let store = SessionStore::open(Arc::new(MemoryStore::new()), "cs");

        store.load(&api, 5).await.unwrap();
        let err = store.load(&api, 6).await.unwrap_err();
        assert_eq!(err.user_message(), "세션을 찾을 수 없습니다.");
        assert_eq!(store.current().map(|s| s.id), Some(5));
    }

    #[tokio::test]
    async fn test_refresh_without_session_is_noop() {
        let http = FakeHttp::new();
        let api = PublicApi::new(http.clone(), "cs");
        let store = SessionStore::open(Arc::new(MemoryStore::new()), "cs");
        assert_eq!(store.refresh(&api).await.unwrap(), None);
        assert!(http.calls().is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_snapshot() {
        let http = FakeHttp::new();
        http.reply("GET", "/api/cs/sessions/5", session_json(5));
        let api = PublicApi::new(http, "cs");
        let storage: SharedStore = Arc::new(MemoryStore::new());
        let store = SessionStore::open(storage.clone(), "cs");

        store.load(&api, 5).await.unwrap();
        store.clear().unwrap();
        assert!(store.current().is_none());
        assert_eq!(storage.get("kupub_session_cs").unwrap(), None);
    }

    #[test]
    fn test_sessions_are_per_department() {
        let storage: SharedStore = Arc::new(MemoryStore::new());
        storage
            .set("kupub_session_cs", &session_json(5).to_string())
            .unwrap();
        assert!(SessionStore::open(storage.clone(), "cs").current().is_some());
        assert!(SessionStore::open(storage, "math").current().is_none());
    }
}
