//! Adaptive practice engine for music skill training.
//!
//! Decides what a learner should practice next and how hard it should be:
//! per-item priority scoring with spaced-repetition intervals, performance
//! trends over session history, a skill-dependency graph with adaptive
//! difficulty, and time-boxed session plans. Persistence is a thin per-user
//! JSON store; rendering and scheduling belong to the embedding app.

pub mod config;
pub mod engine;
pub mod session;
pub mod store;
