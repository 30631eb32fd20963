use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::session::record::PracticeSession;

/// Most recent sessions kept in the log; older entries are evicted.
pub const SESSION_LOG_CAP: usize = 1000;

/// Append-only session log, oldest first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionHistory {
    pub sessions: Vec<PracticeSession>,
}

impl SessionHistory {
    pub fn push(&mut self, session: PracticeSession) {
        self.sessions.push(session);
        if self.sessions.len() > SESSION_LOG_CAP {
            let excess = self.sessions.len() - SESSION_LOG_CAP;
            self.sessions.drain(..excess);
        }
    }

    /// Trailing consecutive-day streak. Zero unless the most recent practice
    /// day is today or yesterday relative to `now`.
    pub fn current_streak(&self, now: DateTime<Utc>) -> u32 {
        let days: BTreeSet<i32> = self
            .sessions
            .iter()
            .map(|s| s.timestamp.num_days_from_ce())
            .collect();
        let last = match days.last() {
            Some(&d) => d,
            None => return 0,
        };
        if last < now.num_days_from_ce() - 1 {
            return 0;
        }

        let mut streak = 1u32;
        while days.contains(&(last - streak as i32)) {
            streak += 1;
        }
        streak
    }

}
