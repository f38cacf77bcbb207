use shared::models::Order;

use super::{SessionWithOrders, Stage, StageFilter};

/// Normalized free-text query; the empty query matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn hit(&self, field: &str) -> bool {
        field.to_lowercase().contains(&self.0)
    }

    fn hit_opt(&self, field: Option<&str>) -> bool {
        field.is_some_and(|f| self.hit(f))
    }

    /// Order id, table code or any item name
    pub fn matches_order(&self, order: &Order) -> bool {
        if self.is_empty() {
            return true;
        }
        order.id.to_string().contains(&self.0)
            || self.hit_opt(order.table_code.as_deref())
            || order.items.iter().any(|item| self.hit(&item.name))
    }

    /// Guest name, phone, table code, session code, session id, or any of
    /// the session's orders
    pub fn matches_session(&self, entry: &SessionWithOrders) -> bool {
        if self.is_empty() {
            return true;
        }
        let session = &entry.session;
        self.hit(&session.guest_name)
            || self.hit_opt(session.guest_phone.as_deref())
            || self.hit_opt(session.table_code.as_deref())
            || self.hit_opt(session.session_code.as_deref())
            || session.id.to_string().contains(&self.0)
            || entry.orders.iter().any(|order| self.matches_order(order))
    }
}

/// A session paired with its derived stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagedSession<'a> {
    pub entry: &'a SessionWithOrders,
    pub stage: Stage,
}

/// Classify every session, keeping those that match `query` and `filter`.
/// Input order is preserved.
pub fn classify_and_filter<'a>(
    list: &'a [SessionWithOrders],
    filter: StageFilter,
    query: &SearchQuery,
) -> Vec<StagedSession<'a>> {
    list.iter()
        .filter(|entry| query.matches_session(entry))
        .map(|entry| StagedSession {
            entry,
            stage: entry.stage(),
        })
        .filter(|staged| filter.matches(staged.stage))
        .collect()
}
