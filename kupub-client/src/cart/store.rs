use shared::models::{Order, OrderRequest, PricingSettings};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Cart, CartAction, CartSummary, price_cart, reduce};
use crate::api::PublicApi;
use crate::http::HttpClient;
use crate::storage::{
    KeyValueStore, SharedStore, StorageError, StorageEvent, StorageKey, TypedStorage,
};
use crate::{ClientError, ClientResult};

/// Value stored under the fees-paid key
const FEES_PAID_MARKER: &str = "true";

/// Persistent cart of one department
#[derive(Debug)]
pub struct CartStore {
    storage: SharedStore,
    dept: String,
    cart: RwLock<Cart>,
}

impl CartStore {
    /// Open the cart of `dept`, restoring the persisted one if it belongs
    /// to the same department
    pub fn open(storage: SharedStore, dept: impl Into<String>) -> Self {
        let dept = dept.into();
        let cart = read_cart(&storage, &dept);
        Self {
            storage,
            dept,
            cart: RwLock::new(cart),
        }
    }

    pub fn dept(&self) -> &str {
        &self.dept
    }

    pub fn cart(&self) -> Cart {
        self.read().clone()
    }

    pub fn session_id(&self) -> Option<i64> {
        self.read().session_id
    }

    /// Apply `action` and persist the result
    pub fn dispatch(&self, action: CartAction) -> Result<Cart, StorageError> {
        let mut guard = self.write();
        let previous_session = guard.session_id;
        let next = reduce(guard.clone(), action);

        self.storage
            .save(&StorageKey::Cart(&self.dept).as_key(), &next)?;

        // A new session starts with its table fee unpaid
        if next.session_id != previous_session {
            self.storage.remove(&self.fees_key(next.session_id))?;
            tracing::debug!(dept = %self.dept, session_id = ?next.session_id, "Cart bound to new session");
        }

        *guard = next.clone();
        Ok(next)
    }

    /// Whether the table fee was already charged to the current session
    pub fn fees_paid(&self) -> bool {
        let Some(session_id) = self.session_id() else {
            return false;
        };
        match self.storage.get(&self.fees_key(Some(session_id))) {
            Ok(value) => value.as_deref() == Some(FEES_PAID_MARKER),
            Err(e) => {
                tracing::warn!(dept = %self.dept, error = %e, "Failed to read fees flag");
                false
            }
        }
    }

    /// Record that the current session has been charged the table fee.
    ///
    /// No-op while the cart has no session.
    pub fn mark_fees_paid(&self) -> Result<(), StorageError> {
        let Some(session_id) = self.session_id() else {
            return Ok(());
        };
        self.storage
            .set(&self.fees_key(Some(session_id)), FEES_PAID_MARKER)?;
        tracing::debug!(dept = %self.dept, session_id, "Table fee marked as paid");
        Ok(())
    }

    /// Re-read the persisted cart after an external change
    pub fn reload(&self) {
        *self.write() = read_cart(&self.storage, &self.dept);
    }

    /// Whether a storage event concerns this cart or its fees flag
    pub fn affected_by(&self, event: &StorageEvent) -> bool {
        if event.key == StorageKey::Cart(&self.dept).as_key() {
            return true;
        }
        let fees = self.fees_key(None);
        match event.key.strip_prefix(fees.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('_'),
            None => false,
        }
    }

    pub fn summary(&self, pricing: &PricingSettings) -> CartSummary {
        let fees_paid = self.fees_paid();
        let cart = self.read();
        price_cart(
            &cart.items,
            pricing,
            fees_paid,
            cart.discount_code.as_deref(),
        )
    }

    /// Build the order request for the current cart
    pub fn order_request(&self, pricing: &PricingSettings) -> ClientResult<OrderRequest> {
        let summary = self.summary(pricing);
        let cart = self.read();
        if cart.is_empty() {
            return Err(ClientError::Validation("장바구니가 비어 있습니다.".into()));
        }
        let Some(session_id) = cart.session_id else {
            return Err(ClientError::Validation(
                "세션 정보가 없습니다. 다시 입장해주세요.".into(),
            ));
        };
        Ok(OrderRequest {
            session_id,
            include_table_fee: summary.include_table_fee,
            note: cart.note.clone(),
            discount_code: cart.discount_code.clone(),
            items: cart.items.iter().map(|item| item.to_request()).collect(),
        })
    }

    /// Submit the cart as an order.
    ///
    /// On success the cart is cleared (session kept) and, if the server
    /// charged a table fee, the session's fees flag is set. Nothing is sent
    /// for an empty cart or a cart without a session.
    pub async fn submit<C: HttpClient>(
        &self,
        api: &PublicApi<C>,
        pricing: &PricingSettings,
    ) -> ClientResult<Order> {
        let request = self.order_request(pricing)?;
        let order = api.create_order(&request).await.inspect_err(|e| {
            tracing::warn!(dept = %self.dept, session_id = request.session_id, error = %e, "Order submission failed");
        })?;

        // The order exists server-side; local bookkeeping failures are only logged
        if let Err(e) = self.dispatch(CartAction::Clear) {
            tracing::warn!(dept = %self.dept, error = %e, "Failed to clear cart after order");
        }
        if order.charged_table_fee()
            && let Err(e) = self.mark_fees_paid()
        {
            tracing::warn!(dept = %self.dept, error = %e, "Failed to persist fees flag");
        }
        Ok(order)
    }

    fn fees_key(&self, session_id: Option<i64>) -> String {
        StorageKey::FeesPaid {
            dept: &self.dept,
            session_id,
        }
        .as_key()
    }

    fn read(&self) -> RwLockReadGuard<'_, Cart> {
        self.cart.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cart> {
        self.cart.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_cart(storage: &SharedStore, dept: &str) -> Cart {
    match storage.load::<Cart>(&StorageKey::Cart(dept).as_key()) {
        Some(cart) if cart.dept == dept => cart,
        Some(cart) => {
            tracing::debug!(expected = dept, found = %cart.dept, "Ignoring cart of another department");
            Cart::empty(dept)
        }
        None => Cart::empty(dept),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeHttp;
    use crate::storage::{MemoryStore, StorageChange};
    use serde_json::json;
    use shared::error::{ApiError, ErrorCode};
    use shared::models::Discount;
    use std::sync::Arc;

    fn add(menu_id: i64, price: i64) -> CartAction {
        CartAction::AddItem {
            menu_id,
            name: format!("menu-{menu_id}"),
            price,
            image_url: None,
        }
    }

    fn pricing() -> PricingSettings {
        PricingSettings {
            table_fee: 2000,
            discounts: vec![Discount {
                label: "학생회".into(),
                amount: -1000,
                condition: "STUDENT".into(),
            }],
        }
    }

    fn order_json(table_fee: i64) -> serde_json::Value {
        json!({
            "id": 101, "sessionId": 7, "subtotal": 13000, "tableFee": table_fee,
            "totalPrice": 13000 + table_fee, "status": "PENDING", "paymentStatus": "PENDING",
            "items": [], "createdAt": "2024-05-01T19:00:00"
        })
    }

    fn filled_store(storage: SharedStore) -> CartStore {
        let store = CartStore::open(storage, "cs");
        store.dispatch(CartAction::SetSession(7)).unwrap();
        store.dispatch(add(1, 5000)).unwrap();
        store.dispatch(add(1, 5000)).unwrap();
        store.dispatch(add(2, 3000)).unwrap();
        store
    }

    #[test]
    fn test_fees_flag_is_one_shot_per_session() {
        let store = filled_store(Arc::new(MemoryStore::new()));
        assert_eq!(store.summary(&pricing()).total, 15000);

        store.mark_fees_paid().unwrap();
        assert!(store.fees_paid());
        assert_eq!(store.summary(&pricing()).total, 13000);

        // New session: fee applies again
        store.dispatch(CartAction::SetSession(8)).unwrap();
        assert!(!store.fees_paid());
        assert_eq!(store.summary(&pricing()).total, 15000);
    }

    #[test]
    fn test_same_session_keeps_fees_flag() {
        let store = filled_store(Arc::new(MemoryStore::new()));
        store.mark_fees_paid().unwrap();
        store.dispatch(CartAction::SetSession(7)).unwrap();
        assert!(store.fees_paid());
    }

    #[test]
    fn test_mark_fees_paid_without_session_is_noop() {
        let storage: SharedStore = Arc::new(MemoryStore::new());
        let store = CartStore::open(storage.clone(), "cs");
        store.mark_fees_paid().unwrap();
        assert!(!store.fees_paid());
        assert_eq!(storage.get("kupub_fees_paid_cs").unwrap(), None);
    }

    #[test]
    fn test_persisted_and_restored() {
        let storage: SharedStore = Arc::new(MemoryStore::new());
        filled_store(storage.clone()).mark_fees_paid().unwrap();

        let reopened = CartStore::open(storage.clone(), "cs");
        assert_eq!(reopened.cart().item_count(), 3);
        assert!(reopened.fees_paid());
        assert_eq!(storage.get("kupub_fees_paid_cs_7").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_cart_of_other_department_is_ignored() {
        let storage: SharedStore = Arc::new(MemoryStore::new());
        filled_store(storage.clone());

        let foreign = Cart {
            dept: "math".into(),
            ..storage.load::<Cart>("kupub_cart_cs").unwrap()
        };
        storage.save("kupub_cart_cs", &foreign).unwrap();

        let store = CartStore::open(storage.clone(), "cs");
        assert!(store.cart().is_empty());
        assert_eq!(store.cart().dept, "cs");

        let other = CartStore::open(storage, "math");
        assert!(other.cart().is_empty());
    }

    #[test]
    fn test_reload_after_external_change() {
        let storage: SharedStore = Arc::new(MemoryStore::new());
        let mut events = storage.subscribe();
        let a = CartStore::open(storage.clone(), "cs");
        let b = CartStore::open(storage.clone(), "cs");

        a.dispatch(add(1, 5000)).unwrap();
        let event = events.try_recv().unwrap();
        assert_eq!(event.change, StorageChange::Set);
        assert!(b.affected_by(&event));
        assert!(b.cart().is_empty());

        b.reload();
        assert_eq!(b.cart().quantity_of(1), 1);
    }

    #[test]
    fn test_affected_by_ignores_other_keys() {
        let store = CartStore::open(Arc::new(MemoryStore::new()), "cs");
        let event = |key: &str| StorageEvent {
            key: key.into(),
            change: StorageChange::Set,
        };
        assert!(store.affected_by(&event("kupub_fees_paid_cs_3")));
        assert!(!store.affected_by(&event("kupub_cart_math")));
        assert!(!store.affected_by(&event("kupub_session_cs")));
    }

    #[test]
    fn test_affected_by_ignores_departments_sharing_a_prefix() {
        let store = CartStore::open(Arc::new(MemoryStore::new()), "cs");
        let event = |key: &str| StorageEvent {
            key: key.into(),
            change: StorageChange::Set,
        };
        assert!(store.affected_by(&event("kupub_fees_paid_cs")));
        assert!(!store.affected_by(&event("kupub_fees_paid_cs2_5")));
        assert!(!store.affected_by(&event("kupub_fees_paid_cs2")));
        assert!(!store.affected_by(&event("kupub_cart_cs2")));
    }

    #[tokio::test]
    async fn test_submit_clears_cart_and_marks_fees() {
        let http = FakeHttp::new();
        http.reply("POST", "/api/cs/orders", order_json(2000));
        let api = PublicApi::new(http.clone(), "cs");

        let store = filled_store(Arc::new(MemoryStore::new()));
        store
            .dispatch(CartAction::SetDiscountCode(Some("STUDENT".into())))
            .unwrap();
        let order = store.submit(&api, &pricing()).await.unwrap();
        assert_eq!(order.id, 101);

        let body = http.calls()[0].body.clone().unwrap();
        assert_eq!(body["sessionId"], 7);
        assert_eq!(body["includeTableFee"], true);
        assert_eq!(body["discountCode"], "STUDENT");
        assert_eq!(body["items"].as_array().unwrap().len(), 2);

        let cart = store.cart();
        assert!(cart.is_empty());
        assert_eq!(cart.session_id, Some(7));
        assert_eq!(cart.discount_code, None);
        assert!(store.fees_paid());
    }

    #[tokio::test]
    async fn test_submit_without_fee_charge_leaves_flag() {
        let http = FakeHttp::new();
        http.reply("POST", "/api/cs/orders", order_json(0));
        let api = PublicApi::new(http, "cs");

        let store = filled_store(Arc::new(MemoryStore::new()));
        store.submit(&api, &pricing()).await.unwrap();
        assert!(!store.fees_paid());
    }

    #[tokio::test]
    async fn test_submit_validation_sends_nothing() {
        let http = FakeHttp::new();
        let api = PublicApi::new(http.clone(), "cs");

        let empty = CartStore::open(Arc::new(MemoryStore::new()), "cs");
        empty.dispatch(CartAction::SetSession(7)).unwrap();
        let err = empty.submit(&api, &pricing()).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        let sessionless = CartStore::open(Arc::new(MemoryStore::new()), "cs");
        sessionless.dispatch(add(1, 5000)).unwrap();
        let err = sessionless.submit(&api, &pricing()).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        assert!(http.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_cart() {
        let http = FakeHttp::new();
        http.fail(
            "POST",
            "/api/cs/orders",
            ApiError::new(ErrorCode::BusinessError, "품절된 메뉴가 있습니다."),
        );
        let api = PublicApi::new(http, "cs");

        let store = filled_store(Arc::new(MemoryStore::new()));
        let err = store.submit(&api, &pricing()).await.unwrap_err();
        assert_eq!(err.user_message(), "품절된 메뉴가 있습니다.");
        assert_eq!(store.cart().item_count(), 3);
        assert!(!store.fees_paid());
    }
}
