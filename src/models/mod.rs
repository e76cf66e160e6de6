pub mod user;
pub mod activity;
pub mod category;

pub use user::{User, UserInput};
pub use activity::{Activity, ActivityInput, ActivityStatus};
pub use category::{Category, CategoryInput, Priority};

/// Legacy rows store missing optional text as `''`; treat both as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
