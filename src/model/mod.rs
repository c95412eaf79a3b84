use serde::{Deserialize, Serialize};

pub use counters::*;

mod counters;

pub type Timestamp = chrono::DateTime<chrono::Utc>;

pub fn now() -> Timestamp {
    chrono::Utc::now()
}

/// Which windowed counter a scheduled reset firing targets. The two kinds
/// run on independent timers and touch disjoint fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetKind {
    Daily,
    Weekly,
}

impl std::fmt::Display for ResetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetKind::Daily => write!(f, "daily"),
            ResetKind::Weekly => write!(f, "weekly"),
        }
    }
}

/// Sort key for a "most popular" query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    TotalViews,
    #[default]
    DailyViews,
    WeeklyViews,
}
