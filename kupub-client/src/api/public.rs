use shared::models::{
    DepartmentSettings, MenuResponse, Order, OrderRequest, Reservation, ReservationRequest,
    Session, SessionStartRequest,
};

use super::{dept_path, encode_segment};
use crate::ClientResult;
use crate::http::{HttpClient, NetworkHttpClient};

/// Customer-facing endpoints of one department
#[derive(Debug, Clone)]
pub struct PublicApi<C = NetworkHttpClient> {
    http: C,
    dept: String,
}

impl<C: HttpClient> PublicApi<C> {
    pub fn new(http: C, dept: impl Into<String>) -> Self {
        Self {
            http,
            dept: dept.into(),
        }
    }

    pub fn dept(&self) -> &str {
        &self.dept
    }

    fn path(&self, suffix: &str) -> String {
        dept_path(&self.dept, suffix)
    }

    /// `GET /api/{dept}/settings`
    pub async fn fetch_settings(&self) -> ClientResult<DepartmentSettings> {
        self.http.get(&self.path("/settings")).await
    }

    /// `GET /api/{dept}/menus`
    pub async fn fetch_menus(&self) -> ClientResult<MenuResponse> {
        self.http.get(&self.path("/menus")).await
    }

    /// `POST /api/{dept}/reservations`
    pub async fn create_reservation(&self, req: &ReservationRequest) -> ClientResult<Reservation> {
        self.http.post(&self.path("/reservations"), req).await
    }

    /// `POST /api/{dept}/sessions/start`
    pub async fn start_session(&self, req: &SessionStartRequest) -> ClientResult<Session> {
        let session: Session = self.http.post(&self.path("/sessions/start"), req).await?;
        tracing::info!(dept = %self.dept, session_id = session.id, kind = ?session.session_type, "Session started");
        Ok(session)
    }

    /// `GET /api/{dept}/sessions/{id}`
    pub async fn get_session(&self, session_id: i64) -> ClientResult<Session> {
        self.http
            .get(&self.path(&format!("/sessions/{session_id}")))
            .await
    }

    /// `GET /api/{dept}/sessions/code/{code}`
    pub async fn get_session_by_code(&self, code: &str) -> ClientResult<Session> {
        self.http
            .get(&self.path(&format!("/sessions/code/{}", encode_segment(code))))
            .await
    }

    /// `POST /api/{dept}/orders`
    pub async fn create_order(&self, req: &OrderRequest) -> ClientResult<Order> {
        let order: Order = self.http.post(&self.path("/orders"), req).await?;
        tracing::info!(
            dept = %self.dept,
            order_id = order.id,
            session_id = order.session_id,
            total = order.total_price,
            "Order created"
        );
        Ok(order)
    }

    /// `GET /api/{dept}/orders/{id}`
    pub async fn get_order(&self, order_id: i64) -> ClientResult<Order> {
        self.http
            .get(&self.path(&format!("/orders/{order_id}")))
            .await
    }
}
