use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::session::record::PracticeSession;

/// Per-user lifetime aggregate: xp, session count, practice streak.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PracticeProfile {
    pub total_xp: f64,
    pub total_sessions: u32,
    pub streak_days: u32,
    pub best_streak: u32,
    pub last_practice_date: Option<String>,
}

impl PracticeProfile {
    /// Fold a completed session into the aggregate. Streak advances once
    /// per calendar day: consecutive days extend it, a gap resets it.
    pub fn record_session(&mut self, session: &PracticeSession) {
        self.total_xp += session.score;
        self.total_sessions += 1;

        let today = session.timestamp.format("%Y-%m-%d").to_string();
        if self.last_practice_date.as_deref() != Some(&today) {
            if let Some(ref last) = self.last_practice_date {
                let yesterday = (session.timestamp - Duration::days(1))
                    .format("%Y-%m-%d")
                    .to_string();
                if *last == yesterday {
                    self.streak_days += 1;
                } else {
                    self.streak_days = 1;
                }
            } else {
                self.streak_days = 1;
            }
            self.best_streak = self.best_streak.max(self.streak_days);
            self.last_practice_date = Some(today);
        }
    }

    pub fn level(&self) -> u32 {
        let level = (self.total_xp / 100.0).sqrt() as u32;
        level.max(1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::engine::difficulty::DifficultyTier;
    use crate::engine::item_stats::Category;
    use crate::session::record::SessionKind;

    fn session_on(day: u32) -> PracticeSession {
        PracticeSession::from_results(
            SessionKind::QuickFix,
            10,
            10,
            300.0,
            DifficultyTier::Beginner,
            vec![Category::Notes],
            Utc.with_ymd_and_hms(2025, 3, day, 18, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_records_xp_and_count() {
        let mut profile = PracticeProfile::default();
        profile.record_session(&session_on(1));
        assert_eq!(profile.total_xp, 50.0);
        assert_eq!(profile.total_sessions, 1);
        assert_eq!(profile.streak_days, 1);
    }

    #[test]
    fn test_same_day_does_not_extend_streak() {
        let mut profile = PracticeProfile::default();
        profile.record_session(&session_on(1));
        profile.record_session(&session_on(1));
        assert_eq!(profile.streak_days, 1);
        assert_eq!(profile.total_sessions, 2);
    }

    #[test]
    fn test_consecutive_days_extend_streak() {
        let mut profile = PracticeProfile::default();
        for day in 1..=4 {
            profile.record_session(&session_on(day));
        }
        assert_eq!(profile.streak_days, 4);
        assert_eq!(profile.best_streak, 4);
    }

    #[test]
    fn test_gap_resets_streak_but_keeps_best() {
        let mut profile = PracticeProfile::default();
        for day in 1..=3 {
            profile.record_session(&session_on(day));
        }
        profile.record_session(&session_on(10));
        assert_eq!(profile.streak_days, 1);
        assert_eq!(profile.best_streak, 3);
    }

    #[test]
    fn test_level_starts_at_one() {
        let profile = PracticeProfile::default();
        assert_eq!(profile.level(), 1);
    }

    #[test]
    fn test_level_grows_with_xp() {
        let mut high = PracticeProfile::default();
        high.total_xp = 10_000.0;
        let mut low = PracticeProfile::default();
        low.total_xp = 400.0;
        assert!(high.level() > low.level());
        assert_eq!(high.level(), 10);
    }
}
