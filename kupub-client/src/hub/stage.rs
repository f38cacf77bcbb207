use serde::{Deserialize, Serialize};
use shared::models::{Order, PaymentStatus, Session, SessionStatus};

use super::SessionWithOrders;

/// Where a session stands in the service lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// At least one order waits for payment confirmation
    Payment,
    /// Paid but not seated
    Assignment,
    /// Seated and active
    Active,
    /// No order yet
    Reservation,
    Done,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Payment,
        Stage::Assignment,
        Stage::Active,
        Stage::Reservation,
        Stage::Done,
    ];
}

/// Stage tab of the service hub
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StageFilter {
    #[default]
    All,
    Only(Stage),
}

impl StageFilter {
    pub fn matches(self, stage: Stage) -> bool {
        match self {
            StageFilter::All => true,
            StageFilter::Only(only) => only == stage,
        }
    }
}

impl From<Stage> for StageFilter {
    fn from(stage: Stage) -> Self {
        StageFilter::Only(stage)
    }
}

/// Classify a session by its orders. First matching rule wins:
///
/// 1. no orders: [`Stage::Reservation`]
/// 2. any payment pending: [`Stage::Payment`]
/// 3. no table and any payment confirmed: [`Stage::Assignment`]
/// 4. active with a table: [`Stage::Active`]
/// 5. otherwise [`Stage::Done`]
pub fn determine_stage<'a, I>(session: &Session, orders: I) -> Stage
where
    I: IntoIterator<Item = &'a Order>,
{
    let mut any_order = false;
    let mut pending_payment = false;
    let mut confirmed_payment = false;
    for order in orders {
        any_order = true;
        match order.payment_status {
            PaymentStatus::Pending => pending_payment = true,
            PaymentStatus::Confirmed => confirmed_payment = true,
            PaymentStatus::Failed | PaymentStatus::NotRequired => {}
        }
    }

    if !any_order {
        return Stage::Reservation;
    }
    if pending_payment {
        return Stage::Payment;
    }
    if session.table_id.is_none() && confirmed_payment {
        return Stage::Assignment;
    }
    if session.status == SessionStatus::Active && session.table_id.is_some() {
        return Stage::Active;
    }
    Stage::Done
}

impl SessionWithOrders {
    pub fn stage(&self) -> Stage {
        determine_stage(&self.session, &self.orders)
    }
}
