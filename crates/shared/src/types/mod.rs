//! Common types used across the workspace.

pub mod currency;
pub mod locale;
pub mod rounding;

pub use currency::Currency;
pub use locale::Locale;
pub use rounding::{MAX_SCALE, RoundingRule, divide_exact};
