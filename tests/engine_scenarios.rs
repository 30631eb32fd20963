use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use etude::config::Config;
use etude::engine::analytics::{HeuristicPercentile, build_report};
use etude::engine::difficulty::{DifficultyTier, adaptive_difficulty};
use etude::engine::item_stats::{Category, ItemStatsStore};
use etude::engine::priority::compute_priority_queue;
use etude::engine::recommend::{LongSessionPolicy, recommend};
use etude::engine::skill_graph::{generate_path, update_progress};
use etude::engine::trend::{TrendPeriod, TrendSummary, trend};
use etude::session::profile::PracticeProfile;
use etude::session::record::{PracticeSession, SessionKind};
use etude::store::json_store::JsonStore;

fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

fn session(ts: DateTime<Utc>, correct: u32, attempts: u32, tier: DifficultyTier) -> PracticeSession {
    PracticeSession::from_results(
        SessionKind::BalancedGrowth,
        correct,
        attempts,
        900.0,
        tier,
        vec![Category::Notes, Category::Chords],
        ts,
    )
}

/// A user practices for a week: results are recorded, the queue reflects
/// weakness, the path and plan follow, and everything survives the store.
#[test]
fn full_practice_cycle_through_store() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let user = "learner";
    let mut now = noon(2025, 3, 1);

    let mut stats = ItemStatsStore::default();
    let mut profile = PracticeProfile::default();

    for day in 0..7 {
        now = noon(2025, 3, 1 + day);
        // One strong item, one weak item per session
        stats.record_result("a4", Category::Notes, 9, 10, now);
        stats.record_result("dim7", Category::Chords, 2, 10, now);

        let s = session(now, 11, 20, DifficultyTier::Beginner);
        profile.record_session(&s);
        store.append_session(user, s).unwrap();
    }
    store.save_item_stats(user, &stats).unwrap();
    store.save_profile(user, &profile).unwrap();

    // Reload everything from disk
    let stats = store.load_item_stats(user);
    let history = store.load_sessions(user);
    let profile = store.load_profile(user);

    assert_eq!(history.sessions.len(), 7);
    assert_eq!(profile.total_sessions, 7);
    assert_eq!(profile.streak_days, 7);
    assert_eq!(history.current_streak(now), 7);

    // The weak chord item leads the priority queue
    let queue = compute_priority_queue(&stats.items, now);
    assert_eq!(queue[0].item_id, "dim7");
    assert!(queue[0].priority > queue[1].priority);

    // Path generation sees chords as the weak category
    let path = generate_path(user, &stats.items, &history.sessions, now);
    assert!(path.weak_categories.contains(&Category::Chords));
    store.save_learning_path(user, &path).unwrap();
    let path = store.load_learning_path(user).unwrap();

    // A medium-budget plan leads with the weak category
    let plan = recommend(
        20,
        &stats.items,
        &history,
        &path,
        Category::Notes,
        LongSessionPolicy::PreferReview,
        now,
    );
    assert_eq!(plan.kind, SessionKind::DeepDive);
    assert_eq!(plan.categories[0], Category::Chords);
}

/// Spec scenario: 6000 xp at 88% accuracy is expert on a flat trend and
/// advanced after a sharp decline, with distinct reasons.
#[test]
fn difficulty_scenario_expert_with_downgrade() {
    let now = noon(2025, 3, 10);
    let flat = TrendSummary::flat();

    let base = adaptive_difficulty(6_000.0, 88.0, &flat, now);
    assert_eq!(base.tier, DifficultyTier::Expert);

    let mut declining = TrendSummary::flat();
    declining.accuracy_change_pct = -15.0;
    let dropped = adaptive_difficulty(6_000.0, 88.0, &declining, now);
    assert_eq!(dropped.tier, DifficultyTier::Advanced);
    assert_ne!(dropped.reason, base.reason);
}

/// Trend classification over a real session log, through the period filter.
#[test]
fn trend_over_session_log() {
    let now = noon(2025, 3, 9);
    let mut sessions = Vec::new();
    for (day, correct) in [(1u32, 16u32), (2, 16), (3, 20), (4, 20)] {
        // 16/20 = 80%, 20/20 = 100% -> +25% across halves
        sessions.push(session(noon(2025, 3, day), correct, 20, DifficultyTier::Beginner));
    }

    let summary = trend(&sessions, TrendPeriod::Week, now);
    assert_eq!(
        summary.trend,
        etude::engine::trend::TrendDirection::Improving
    );
    assert_eq!(summary.daily_points.len(), 4);

    // The same sessions fall outside a week window a month later
    let later = noon(2025, 4, 9);
    let empty = trend(&sessions, TrendPeriod::Week, later);
    assert!(empty.daily_points.is_empty());
    assert_eq!(empty.trend, etude::engine::trend::TrendDirection::Stable);
}

/// Completing both prerequisites in either order yields the same unlock
/// state, and persisting between steps changes nothing.
#[test]
fn unlock_order_independent_through_store() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let now = noon(2025, 3, 10);

    // seventh_chords needs minor_triads and compound_intervals
    let prep = |order: [&str; 2]| {
        let mut path = generate_path("u", &[], &[], now);
        for id in ["note_names", "major_triads", "interval_recognition"] {
            path = update_progress(path, id, 100, now).unwrap();
        }
        for id in order {
            store.save_learning_path("u", &path).unwrap();
            path = store.load_learning_path("u").unwrap();
            path = update_progress(path, id, 100, now).unwrap();
        }
        path
    };

    let a = prep(["minor_triads", "compound_intervals"]);
    let b = prep(["compound_intervals", "minor_triads"]);

    for path in [&a, &b] {
        assert!(path.node("seventh_chords").unwrap().is_unlocked);
        assert!(!path.node("seventh_chords").unwrap().is_completed);
    }
    assert_eq!(a.completion_pct, b.completion_pct);
    assert_eq!(a.recommended_queue, b.recommended_queue);
}

/// After one prerequisite of two, the dependent stays locked.
#[test]
fn single_prerequisite_does_not_unlock() {
    let now = noon(2025, 3, 10);
    let mut path = generate_path("u", &[], &[], now);
    for id in ["note_names", "major_triads", "minor_triads"] {
        path = update_progress(path, id, 100, now).unwrap();
    }
    // compound_intervals still incomplete
    assert!(!path.node("seventh_chords").unwrap().is_unlocked);
}

/// Analytics caching honors the configured TTL against an injected clock.
#[test]
fn analytics_cache_ttl_cycle() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let config = Config::default();
    let t0 = noon(2025, 3, 10);

    assert!(store.load_cached_analytics("u").is_none());

    let report = build_report(&[], &[], &HeuristicPercentile, t0);
    store.save_cached_analytics("u", &report, t0).unwrap();

    let cached = store.load_cached_analytics("u").unwrap();
    assert!(cached.is_fresh(t0 + Duration::minutes(30), config.cache_ttl_minutes));
    assert!(!cached.is_fresh(t0 + Duration::hours(2), config.cache_ttl_minutes));

    // Miss path: recompute and rewrite with a later stamp
    let t1 = t0 + Duration::hours(3);
    let report = build_report(&[], &[], &HeuristicPercentile, t1);
    store.save_cached_analytics("u", &report, t1).unwrap();
    let cached = store.load_cached_analytics("u").unwrap();
    assert_eq!(cached.cached_at, t1);
}

/// Budget bands produce the contracted shapes end to end.
#[test]
fn recommendation_band_shapes() {
    let now = noon(2025, 3, 10);
    let stats = ItemStatsStore::default();
    let history = etude::session::history::SessionHistory::default();
    let path = generate_path("u", &stats.items, &[], now);

    let quick = recommend(
        5,
        &stats.items,
        &history,
        &path,
        Category::Notes,
        LongSessionPolicy::PreferReview,
        now,
    );
    assert_eq!(quick.categories.len(), 1);
    assert_eq!(quick.exercises[0].count, 10);
    assert_eq!(quick.exercises[0].difficulty, DifficultyTier::Beginner);

    let deep = recommend(
        20,
        &stats.items,
        &history,
        &path,
        Category::Notes,
        LongSessionPolicy::PreferReview,
        now,
    );
    assert_eq!(deep.categories.len(), 3);
    let counts: Vec<u32> = deep.exercises.iter().map(|e| e.count).collect();
    assert_eq!(counts, vec![20, 15, 15]);
}

/// ItemStat invariants hold through a long random-ish practice run.
#[test]
fn stat_invariants_hold_over_time() {
    let mut stats = ItemStatsStore::default();
    let start = noon(2025, 1, 1);
    let items = [
        ("a4", Category::Notes),
        ("p5", Category::Intervals),
        ("cmaj", Category::Chords),
    ];
    for i in 0..200u32 {
        let (id, cat) = items[(i % 3) as usize];
        let attempts = 1 + i % 5;
        let correct = attempts.min(i % 7);
        stats.record_result(id, cat, correct.min(attempts), attempts, start + Duration::hours(i as i64));
    }

    for item in &stats.items {
        assert!(item.correct <= item.total, "{}", item.item_id);
        assert!((0.0..=1.0).contains(&item.accuracy()));
        assert!(item.interval_index < etude::engine::item_stats::INTERVAL_LADDER_DAYS.len());
    }
}
