// State management module.
// The cache/pager sync engine, countdown refresh, and per-tab UI state.

pub mod ads;
pub mod cache;
pub mod expiry;
pub mod links;
pub mod pager;

pub use ads::{AdForm, AdsTab};
pub use cache::{Record, RecordCache};
pub use expiry::{Countdown, ExpiryScheduler};
pub use links::{LinkForm, LinksTab};
pub use pager::{PAGE_SIZE, PageSource, Pager};

/// Expiry delays offered by the create and edit forms, in seconds.
pub const EXPIRY_CHOICES: [(&str, i64); 7] = [
    ("never", 0),
    ("10 minutes", 600),
    ("1 hour", 3_600),
    ("12 hours", 43_200),
    ("1 day", 86_400),
    ("1 week", 604_800),
    ("1 month", 2_592_000),
];

/// Outcome line shown under the active tab.
#[derive(Debug, Clone)]
pub struct Alert {
    pub text: String,
    pub level: AlertLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Success,
    Error,
}

impl Alert {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: AlertLevel::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: AlertLevel::Error,
        }
    }
}
