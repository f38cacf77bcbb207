//! Department Settings Model
//!
//! Read-only configuration fetched per department. Drives theming
//! (branding), entry flow, reservation slots, bank-transfer details and
//! cart pricing.

use serde::{Deserialize, Serialize};

use super::Department;

/// `GET /api/{dept}/settings` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSettings {
    pub department: Department,
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub branding: BrandingSettings,
    pub flow: FlowSettings,
    pub reservation: ReservationSettings,
    pub payment: PaymentSettings,
    pub pricing: PricingSettings,
    pub sms: Option<SmsSettings>,
    pub onboarding: Vec<OnboardingSlide>,
    /// Reservation slots that are closed, as `HH:mm`
    pub reservation_closed: Vec<String>,
}

/// Brand colors as `#RRGGBB` strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandingSettings {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub logo_url: Option<String>,
}

impl Default for BrandingSettings {
    fn default() -> Self {
        Self {
            primary_color: "#6366F1".into(),
            secondary_color: "#F59E0B".into(),
            background_color: "#FFFFFF".into(),
            logo_url: None,
        }
    }
}

/// How a guest may enter the ordering flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    Reservation,
    Qr,
    Code,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowSettings {
    pub entry_modes: Vec<EntryMode>,
    pub show_onboarding: bool,
    pub require_reservation_for_first_order: bool,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            entry_modes: vec![EntryMode::Reservation, EntryMode::Qr, EntryMode::Code],
            show_onboarding: true,
            require_reservation_for_first_order: false,
        }
    }
}

impl FlowSettings {
    pub fn allows(&self, mode: EntryMode) -> bool {
        self.entry_modes.contains(&mode)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservationSettings {
    /// `HH:mm`
    pub start_time: String,
    /// `HH:mm`
    pub end_time: String,
    pub interval_minutes: u32,
    pub duration_minutes: u32,
    pub max_people: u32,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            start_time: "18:00".into(),
            end_time: "23:00".into(),
            interval_minutes: 30,
            duration_minutes: 90,
            max_people: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Transfer,
    Card,
}

/// Bank-transfer details shown on the payment screen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentSettings {
    pub method: PaymentMethod,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

/// Cart pricing configuration. Amounts are whole won.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingSettings {
    /// One-time per-session surcharge, charged on the first order only
    pub table_fee: i64,
    pub discounts: Vec<Discount>,
}

impl PricingSettings {
    /// Discount whose `condition` equals `code`. At most one applies.
    pub fn find_discount(&self, code: &str) -> Option<&Discount> {
        self.discounts.iter().find(|d| d.condition == code)
    }
}

/// Discount rule. `amount` is zero or negative (a credit).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Discount {
    pub label: String,
    pub amount: i64,
    /// Discount code the cart must carry for this rule to apply
    pub condition: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    Aligo,
    #[default]
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmsSettings {
    pub enabled: bool,
    pub provider: SmsProvider,
    pub aligo_api_key: String,
    pub aligo_user_id: String,
    pub sender_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingSlide {
    pub id: String,
    pub image_url: Option<String>,
    pub title: String,
    pub body: String,
    pub order: i32,
}

impl Settings {
    /// Onboarding slides in display order
    pub fn ordered_onboarding(&self) -> Vec<&OnboardingSlide> {
        let mut slides: Vec<&OnboardingSlide> = self.onboarding.iter().collect();
        slides.sort_by_key(|s| s.order);
        slides
    }
}
