use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::engine::difficulty::{DifficultyState, DifficultyTier, adaptive_difficulty};
use crate::engine::item_stats::{Category, ItemStat};
use crate::engine::priority::{improvement_areas, overall_accuracy_pct};
use crate::engine::trend::{TrendPeriod, trend};
use crate::session::record::PracticeSession;

/// Unlocked, incomplete nodes surfaced to the learner.
pub const RECOMMENDED_QUEUE_LEN: usize = 5;

/// A path older than this is regenerated wholesale instead of patched.
const PATH_STALE_HOURS: i64 = 24;

// --- Static template ---

pub struct NodeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub difficulty: DifficultyTier,
    pub prerequisites: &'static [&'static str],
    pub estimated_minutes: u32,
    pub reward_xp: u32,
}

pub const SKILL_TEMPLATE: &[NodeDefinition] = &[
    NodeDefinition {
        id: "note_names",
        name: "Note Names",
        category: Category::Notes,
        difficulty: DifficultyTier::Beginner,
        prerequisites: &[],
        estimated_minutes: 10,
        reward_xp: 50,
    },
    NodeDefinition {
        id: "rhythm_basics",
        name: "Rhythm Basics",
        category: Category::Rhythm,
        difficulty: DifficultyTier::Beginner,
        prerequisites: &[],
        estimated_minutes: 10,
        reward_xp: 50,
    },
    NodeDefinition {
        id: "interval_recognition",
        name: "Interval Recognition",
        category: Category::Intervals,
        difficulty: DifficultyTier::Beginner,
        prerequisites: &["note_names"],
        estimated_minutes: 15,
        reward_xp: 75,
    },
    NodeDefinition {
        id: "major_triads",
        name: "Major Triads",
        category: Category::Chords,
        difficulty: DifficultyTier::Beginner,
        prerequisites: &["note_names"],
        estimated_minutes: 15,
        reward_xp: 75,
    },
    NodeDefinition {
        id: "major_scales",
        name: "Major Scales",
        category: Category::Scales,
        difficulty: DifficultyTier::Intermediate,
        prerequisites: &["note_names", "interval_recognition"],
        estimated_minutes: 20,
        reward_xp: 100,
    },
    NodeDefinition {
        id: "minor_triads",
        name: "Minor Triads",
        category: Category::Chords,
        difficulty: DifficultyTier::Intermediate,
        prerequisites: &["major_triads"],
        estimated_minutes: 15,
        reward_xp: 100,
    },
    NodeDefinition {
        id: "compound_intervals",
        name: "Compound Intervals",
        category: Category::Intervals,
        difficulty: DifficultyTier::Intermediate,
        prerequisites: &["interval_recognition"],
        estimated_minutes: 20,
        reward_xp: 100,
    },
    NodeDefinition {
        id: "syncopation",
        name: "Syncopation",
        category: Category::Rhythm,
        difficulty: DifficultyTier::Intermediate,
        prerequisites: &["rhythm_basics"],
        estimated_minutes: 15,
        reward_xp: 100,
    },
    NodeDefinition {
        id: "minor_scales",
        name: "Minor Scales",
        category: Category::Scales,
        difficulty: DifficultyTier::Advanced,
        prerequisites: &["major_scales"],
        estimated_minutes: 20,
        reward_xp: 150,
    },
    NodeDefinition {
        id: "seventh_chords",
        name: "Seventh Chords",
        category: Category::Chords,
        difficulty: DifficultyTier::Advanced,
        prerequisites: &["minor_triads", "compound_intervals"],
        estimated_minutes: 25,
        reward_xp: 150,
    },
    NodeDefinition {
        id: "polyrhythms",
        name: "Polyrhythms",
        category: Category::Rhythm,
        difficulty: DifficultyTier::Advanced,
        prerequisites: &["syncopation"],
        estimated_minutes: 25,
        reward_xp: 150,
    },
    NodeDefinition {
        id: "modes",
        name: "Modes",
        category: Category::Scales,
        difficulty: DifficultyTier::Expert,
        prerequisites: &["major_scales", "minor_scales"],
        estimated_minutes: 30,
        reward_xp: 200,
    },
    NodeDefinition {
        id: "chord_voicings",
        name: "Chord Voicings",
        category: Category::Chords,
        difficulty: DifficultyTier::Expert,
        prerequisites: &["seventh_chords"],
        estimated_minutes: 30,
        reward_xp: 200,
    },
];

// --- SkillNode / LearningPath ---

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillNode {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub difficulty: DifficultyTier,
    pub prerequisites: Vec<String>,
    pub is_unlocked: bool,
    pub is_completed: bool,
    /// 0..=100.
    pub progress: u8,
    pub estimated_minutes: u32,
    pub reward_xp: u32,
}

impl SkillNode {
    fn from_definition(def: &NodeDefinition) -> Self {
        Self {
            id: def.id.to_string(),
            name: def.name.to_string(),
            category: def.category,
            difficulty: def.difficulty,
            prerequisites: def.prerequisites.iter().map(|p| p.to_string()).collect(),
            is_unlocked: false,
            is_completed: false,
            progress: 0,
            estimated_minutes: def.estimated_minutes,
            reward_xp: def.reward_xp,
        }
    }
}

/// Per-user path through the skill graph. Passed by value into updates,
/// which return the new version; persistence is the caller's job.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearningPath {
    pub user_id: String,
    pub current_node: Option<String>,
    pub recommended_queue: Vec<String>,
    pub skill_nodes: Vec<SkillNode>,
    pub completion_pct: u8,
    pub difficulty: DifficultyState,
    /// Weak-category set captured at generation; keeps queue ordering
    /// consistent across incremental progress updates.
    #[serde(default)]
    pub weak_categories: Vec<Category>,
    pub last_updated: DateTime<Utc>,
}

impl LearningPath {
    pub fn node(&self, id: &str) -> Option<&SkillNode> {
        self.skill_nodes.iter().find(|n| n.id == id)
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.last_updated >= Duration::hours(PATH_STALE_HOURS)
    }
}

// --- SkillGraph ---

/// Adjacency view over a node list: id -> index plus a reverse index
/// id -> dependent ids, so unlock propagation is one bounded pass.
pub struct SkillGraph {
    index: HashMap<String, usize>,
    dependents: HashMap<String, Vec<String>>,
}

impl SkillGraph {
    /// Panics if a prerequisite names a node that does not exist; the
    /// template is fixed at compile time, so that is a configuration bug.
    pub fn new(nodes: &[SkillNode]) -> Self {
        let index: HashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
        for node in nodes {
            for prereq in &node.prerequisites {
                assert!(
                    index.contains_key(prereq),
                    "skill node '{}' references unknown prerequisite '{}'",
                    node.id,
                    prereq
                );
                dependents
                    .entry(prereq.clone())
                    .or_default()
                    .push(node.id.clone());
            }
        }

        Self { index, dependents }
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Recompute unlock flags for every node from current completion state.
    pub fn refresh_unlocks(&self, nodes: &mut [SkillNode]) {
        let completed: HashSet<String> = nodes
            .iter()
            .filter(|n| n.is_completed)
            .map(|n| n.id.clone())
            .collect();
        for node in nodes.iter_mut() {
            node.is_unlocked = node.prerequisites.iter().all(|p| completed.contains(p));
        }
    }

    /// Unlock any dependent of `completed_id` whose prerequisites are now all
    /// complete. Newly unlocked nodes start incomplete, so one pass over the
    /// dependents suffices.
    pub fn propagate_completion(&self, nodes: &mut [SkillNode], completed_id: &str) {
        let completed: HashSet<String> = nodes
            .iter()
            .filter(|n| n.is_completed)
            .map(|n| n.id.clone())
            .collect();
        let Some(dependent_ids) = self.dependents.get(completed_id) else {
            return;
        };
        for dep_id in dependent_ids {
            let idx = self.index[dep_id];
            if nodes[idx]
                .prerequisites
                .iter()
                .all(|p| completed.contains(p))
            {
                nodes[idx].is_unlocked = true;
            }
        }
    }
}

// --- Path operations ---

/// Build a fresh path for the user from their stats and session history.
pub fn generate_path(
    user_id: &str,
    stats: &[ItemStat],
    sessions: &[PracticeSession],
    now: DateTime<Utc>,
) -> LearningPath {
    let mut nodes: Vec<SkillNode> = SKILL_TEMPLATE.iter().map(SkillNode::from_definition).collect();
    let graph = SkillGraph::new(&nodes);
    graph.refresh_unlocks(&mut nodes);

    let total_xp: f64 = sessions.iter().map(|s| s.score).sum();
    let accuracy = overall_accuracy_pct(stats);
    let monthly = trend(sessions, TrendPeriod::Month, now);
    let difficulty = adaptive_difficulty(total_xp, accuracy, &monthly, now);

    let weak_categories = improvement_areas(stats);
    let recommended_queue = recommended_queue(&nodes, &weak_categories);
    let current_node = recommended_queue.first().cloned();
    let completion_pct = completion_pct(&nodes);

    LearningPath {
        user_id: user_id.to_string(),
        current_node,
        recommended_queue,
        skill_nodes: nodes,
        completion_pct,
        difficulty,
        weak_categories,
        last_updated: now,
    }
}

/// Apply a progress report to one node and return the updated path.
/// Completing a node re-runs unlock propagation and refreshes the queue.
pub fn update_progress(
    path: LearningPath,
    node_id: &str,
    progress: u8,
    now: DateTime<Utc>,
) -> Result<LearningPath, EngineError> {
    let mut path = path;
    let graph = SkillGraph::new(&path.skill_nodes);
    let idx = graph
        .node_index(node_id)
        .ok_or_else(|| EngineError::UnknownNode(node_id.to_string()))?;
    if !path.skill_nodes[idx].is_unlocked {
        return Err(EngineError::NodeLocked(node_id.to_string()));
    }

    let node = &mut path.skill_nodes[idx];
    node.progress = progress.min(100);
    let completed_now = node.progress == 100 && !node.is_completed;
    if completed_now {
        node.is_completed = true;
        graph.propagate_completion(&mut path.skill_nodes, node_id);
    }

    path.recommended_queue = recommended_queue(&path.skill_nodes, &path.weak_categories);
    path.current_node = path.recommended_queue.first().cloned();
    path.completion_pct = completion_pct(&path.skill_nodes);
    path.last_updated = now;
    Ok(path)
}

/// Unlocked, incomplete nodes ordered by weak-category membership, then
/// started-before-untouched, then ascending difficulty. Stable on template
/// order.
fn recommended_queue(nodes: &[SkillNode], weak: &[Category]) -> Vec<String> {
    let weak_set: HashSet<Category> = weak.iter().copied().collect();
    let mut open: Vec<&SkillNode> = nodes
        .iter()
        .filter(|n| n.is_unlocked && !n.is_completed)
        .collect();
    open.sort_by_key(|n| (!weak_set.contains(&n.category), n.progress == 0, n.difficulty));
    open.iter()
        .take(RECOMMENDED_QUEUE_LEN)
        .map(|n| n.id.clone())
        .collect()
}

fn completion_pct(nodes: &[SkillNode]) -> u8 {
    let completed = nodes.iter().filter(|n| n.is_completed).count();
    (completed as f64 / nodes.len() as f64 * 100.0).round() as u8
}
