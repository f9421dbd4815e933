//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?month=&q=` for the month schedule.
#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub month: i32,
    pub q: Option<String>,
}

/// `?q=` for reads that support live search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}
