//! In-memory stores for the command center entities
//!
//! Stores are plain synchronous collections. They are owned by
//! [`crate::state::CommandState`] and only ever mutated under its lock.

pub mod agents;
pub mod directives;
pub mod ids;
pub mod knowledge;
pub mod mind_map;
pub mod reviews;

pub use agents::AgentStore;
pub use directives::{DirectivePatch, DirectiveStore};
pub use ids::IdGenerator;
pub use knowledge::KnowledgeBase;
pub use mind_map::MindMap;
pub use reviews::ReviewBoard;
