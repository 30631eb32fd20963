pub mod analytics;
pub mod difficulty;
pub mod item_stats;
pub mod priority;
pub mod recommend;
pub mod skill_graph;
pub mod trend;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown skill node: {0}")]
    UnknownNode(String),
    #[error("skill node '{0}' is locked")]
    NodeLocked(String),
}
