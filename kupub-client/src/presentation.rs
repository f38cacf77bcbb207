//! Labels, colours and display formatting
//!
//! One enum-keyed table serves every admin and kitchen view, so a status
//! renders the same everywhere.

use chrono::{Datelike, Timelike};
use shared::models::{OrderStatus, PaymentStatus};

use crate::hub::{Stage, StageFilter, parse_timestamp};

/// Pill badge: label plus background/foreground colours (`#RRGGBB`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub background: &'static str,
    pub foreground: &'static str,
}

// ========== Palette ==========

const AMBER: (&str, &str) = ("#FEF3C7", "#B45309");
const EMERALD: (&str, &str) = ("#D1FAE5", "#047857");
const RED: (&str, &str) = ("#FEE2E2", "#B91C1C");
const BLUE: (&str, &str) = ("#DBEAFE", "#1D4ED8");
const PURPLE: (&str, &str) = ("#F3E8FF", "#7E22CE");
const NEUTRAL: (&str, &str) = ("#F5F5F5", "#525252");
const NEUTRAL_DARK: (&str, &str) = ("#E5E5E5", "#525252");

const fn badge(label: &'static str, colours: (&'static str, &'static str)) -> Badge {
    Badge {
        label,
        background: colours.0,
        foreground: colours.1,
    }
}

impl Badge {
    pub const fn for_stage(stage: Stage) -> Badge {
        match stage {
            Stage::Payment => badge("결제 대기", AMBER),
            Stage::Assignment => badge("테이블 배정 대기", PURPLE),
            Stage::Active => badge("이용 중", EMERALD),
            Stage::Reservation => badge("예약 전용", NEUTRAL),
            Stage::Done => badge("완료", NEUTRAL_DARK),
        }
    }

    pub const fn for_stage_filter(filter: StageFilter) -> Badge {
        match filter {
            StageFilter::All => badge("전체", NEUTRAL),
            StageFilter::Only(stage) => Badge::for_stage(stage),
        }
    }

    pub const fn for_order_status(status: OrderStatus) -> Badge {
        match status {
            OrderStatus::Pending => badge("접수 대기", AMBER),
            OrderStatus::Preparing => badge("준비중", BLUE),
            OrderStatus::Done => badge("완료", EMERALD),
            OrderStatus::Cancelled => badge("취소", NEUTRAL_DARK),
        }
    }

    /// Shown in place of an order status for a session without orders
    pub const fn no_orders() -> Badge {
        badge("주문 없음", NEUTRAL)
    }

    pub const fn for_payment_status(status: PaymentStatus) -> Badge {
        match status {
            PaymentStatus::Pending => badge("결제 대기", AMBER),
            PaymentStatus::Confirmed => badge("결제 확인", EMERALD),
            PaymentStatus::Failed => badge("결제 실패", RED),
            PaymentStatus::NotRequired => badge("결제 없음", NEUTRAL),
        }
    }
}

/// Section heading of the service hub for a stage tab
pub const fn stage_title(filter: StageFilter) -> &'static str {
    match filter {
        StageFilter::All => "전체 손님",
        StageFilter::Only(Stage::Payment) => "결제 대기 손님",
        StageFilter::Only(Stage::Assignment) => "테이블 배정 대기",
        StageFilter::Only(Stage::Active) => "이용 중 손님",
        StageFilter::Only(Stage::Reservation) => "예약 전용 손님",
        StageFilter::Only(Stage::Done) => "완료된 손님",
    }
}

// ========== Formatting ==========

/// `12000` → `12,000원`
pub fn format_price(won: i64) -> String {
    let digits = won.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if won < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push('원');
    grouped
}

/// Hyphenate 11-digit (3-4-4) and 10-digit (3-3-4) numbers; anything else
/// is returned unchanged
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
        10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => raw.to_string(),
    }
}

/// `HH:mm` of a backend timestamp; unparsable input is returned unchanged
pub fn format_time(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(ts) => format!("{:02}:{:02}", ts.hour(), ts.minute()),
        None => raw.to_string(),
    }
}

/// `M월 D일 HH:mm` of a backend timestamp
pub fn format_date_time(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(ts) => format!(
            "{}월 {}일 {:02}:{:02}",
            ts.month(),
            ts.day(),
            ts.hour(),
            ts.minute()
        ),
        None => raw.to_string(),
    }
}
