use shared::models::{
    AssignTableRequest, CategoryUpsert, MenuCategory, MenuCreate, MenuItem, MenuResponse, MenuUpdate, Order,
    OrderStatus, OrderUpdateRequest, ReceiptRequest, Session, Settings, Table, TableCreate,
    TableLayoutRequest, TableUpdate,
};

use super::dept_path;
use crate::ClientResult;
use crate::http::{HttpClient, NetworkHttpClient};

/// Staff endpoints of one department (`/api/{dept}/admin/...`)
#[derive(Debug, Clone)]
pub struct AdminApi<C = NetworkHttpClient> {
    http: C,
    dept: String,
}

impl<C: HttpClient> AdminApi<C> {
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
        dept_path(&self.dept, &format!("/admin{suffix}"))
    }

    // ========== Sessions ==========

    /// Active sessions, or every session when `all`
    pub async fn list_sessions(&self, all: bool) -> ClientResult<Vec<Session>> {
        let suffix = if all { "/sessions?all=true" } else { "/sessions" };
        self.http.get(&self.path(suffix)).await
    }

    pub async fn assign_table(&self, session_id: i64, table_id: i64) -> ClientResult<Session> {
        let session: Session = self
            .http
            .patch(
                &self.path(&format!("/sessions/{session_id}/assign-table")),
                &AssignTableRequest { table_id },
            )
            .await?;
        tracing::info!(dept = %self.dept, session_id, table_id, "Table assigned");
        Ok(session)
    }

    pub async fn close_session(&self, session_id: i64) -> ClientResult<Session> {
        let session: Session = self
            .http
            .patch_empty(&self.path(&format!("/sessions/{session_id}/close")))
            .await?;
        tracing::info!(dept = %self.dept, session_id, "Session closed");
        Ok(session)
    }

    pub async fn reopen_session(&self, session_id: i64) -> ClientResult<Session> {
        let session: Session = self
            .http
            .patch_empty(&self.path(&format!("/sessions/{session_id}/reopen")))
            .await?;
        tracing::info!(dept = %self.dept, session_id, "Session reopened");
        Ok(session)
    }

    pub async fn delete_session(&self, session_id: i64) -> ClientResult<()> {
        self.http
            .delete::<()>(&self.path(&format!("/sessions/{session_id}")))
            .await?;
        tracing::info!(dept = %self.dept, session_id, "Session deleted");
        Ok(())
    }

    // ========== Orders ==========

    /// All orders, optionally filtered by status
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> ClientResult<Vec<Order>> {
        let suffix = match status {
            Some(status) => format!("/orders?status={}", status_param(status)),
            None => "/orders".to_string(),
        };
        self.http.get(&self.path(&suffix)).await
    }

    pub async fn get_admin_order(&self, order_id: i64) -> ClientResult<Order> {
        self.http
            .get(&self.path(&format!("/orders/{order_id}")))
            .await
    }

    pub async fn update_order(
        &self,
        order_id: i64,
        update: &OrderUpdateRequest,
    ) -> ClientResult<Order> {
        let order: Order = self
            .http
            .patch(&self.path(&format!("/orders/{order_id}")), update)
            .await?;
        tracing::info!(
            dept = %self.dept,
            order_id,
            status = ?order.status,
            payment = ?order.payment_status,
            "Order updated"
        );
        Ok(order)
    }

    /// Send the receipt of an order by SMS; `true` when the provider accepted it
    pub async fn send_receipt(&self, order_id: i64, phone_number: &str) -> ClientResult<bool> {
        #[derive(serde::Deserialize)]
        struct ReceiptResult {
            #[serde(default)]
            sent: bool,
        }

        let body = ReceiptRequest {
            phone_number: phone_number.to_string(),
        };
        let result: ReceiptResult = self
            .http
            .post(&self.path(&format!("/orders/{order_id}/send-receipt")), &body)
            .await?;
        tracing::info!(dept = %self.dept, order_id, sent = result.sent, "Receipt requested");
        Ok(result.sent)
    }

    // ========== Tables ==========

    pub async fn list_tables(&self) -> ClientResult<Vec<Table>> {
        self.http.get(&self.path("/tables")).await
    }

    pub async fn create_table(&self, table: &TableCreate) -> ClientResult<Table> {
        self.http.post(&self.path("/tables"), table).await
    }

    pub async fn update_table(&self, table_id: i64, update: &TableUpdate) -> ClientResult<Table> {
        self.http
            .patch(&self.path(&format!("/tables/{table_id}")), update)
            .await
    }

    pub async fn delete_table(&self, table_id: i64) -> ClientResult<()> {
        self.http
            .delete(&self.path(&format!("/tables/{table_id}")))
            .await
    }

    /// Persist floor-plan positions of several tables at once
    pub async fn save_table_layout(&self, layout: &TableLayoutRequest) -> ClientResult<Vec<Table>> {
        self.http.put(&self.path("/tables/layout"), layout).await
    }

    // ========== Menus ==========

    /// Menu board as the admin edits it (same payload as the public board)
    pub async fn admin_menus(&self) -> ClientResult<MenuResponse> {
        self.http.get(&dept_path(&self.dept, "/menus")).await
    }

    pub async fn create_menu(&self, menu: &MenuCreate) -> ClientResult<MenuItem> {
        self.http.post(&self.path("/menus"), menu).await
    }

    pub async fn update_menu(&self, menu_id: i64, update: &MenuUpdate) -> ClientResult<MenuItem> {
        self.http
            .patch(&self.path(&format!("/menus/{menu_id}")), update)
            .await
    }

    pub async fn delete_menu(&self, menu_id: i64) -> ClientResult<()> {
        self.http
            .delete(&self.path(&format!("/menus/{menu_id}")))
            .await
    }

    pub async fn list_categories(&self) -> ClientResult<Vec<MenuCategory>> {
        self.http.get(&self.path("/menus/categories")).await
    }

    pub async fn create_category(&self, category: &CategoryUpsert) -> ClientResult<MenuCategory> {
        self.http.post(&self.path("/menus/categories"), category).await
    }

    pub async fn update_category(
        &self,
        category_id: i64,
        category: &CategoryUpsert,
    ) -> ClientResult<MenuCategory> {
        self.http
            .patch(&self.path(&format!("/menus/categories/{category_id}")), category)
            .await
    }

    pub async fn delete_category(&self, category_id: i64) -> ClientResult<()> {
        self.http
            .delete(&self.path(&format!("/menus/categories/{category_id}")))
            .await
    }

    // ========== Settings ==========

    pub async fn fetch_admin_settings(&self) -> ClientResult<Settings> {
        self.http.get(&self.path("/settings")).await
    }

    /// Replace the department settings; returns what was stored
    pub async fn update_settings(&self, settings: &Settings) -> ClientResult<Settings> {
        let saved: Settings = self.http.patch(&self.path("/settings"), settings).await?;
        tracing::info!(dept = %self.dept, "Settings saved");
        Ok(saved)
    }
}

fn status_param(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "PENDING",
        OrderStatus::Preparing => "PREPARING",
        OrderStatus::Done => "DONE",
        OrderStatus::Cancelled => "CANCELLED",
    }
}
