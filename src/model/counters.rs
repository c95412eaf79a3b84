use derive_new::new;
use serde::{Deserialize, Serialize};

use super::Timestamp;

/// The per-item counter record.
///
/// All five counter fields are always present; only the two rollover
/// timestamps are nullable, and they stay null until the view path
/// observes its first boundary crossing. The record is mutated by two
/// uncoordinated writers (the view handler and the scheduled reset job),
/// so a fixed shape keeps both sides' expectations of the schema aligned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct ViewCounters {
    pub item_id: String,
    /// Lifetime view count. Never reset.
    #[new(default)]
    pub total_views: u64,
    #[new(default)]
    pub daily_views: u64,
    #[new(default)]
    pub weekly_views: u64,
    /// Last instant the view handler observed a day-boundary crossing.
    /// The scheduled reset job never writes this field.
    #[new(default)]
    pub last_daily_reset_at: Option<Timestamp>,
    /// Last instant the view handler observed a week-boundary crossing.
    /// The scheduled reset job never writes this field.
    #[new(default)]
    pub last_weekly_reset_at: Option<Timestamp>,
}

impl ViewCounters {
    /// A brand-new record: all counters zero, no rollover observed yet.
    pub fn fresh(item_id: impl Into<String>) -> Self {
        Self::new(item_id.into())
    }
}
