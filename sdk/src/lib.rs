//! DLX SDK
//!
//! Shared library providing the command center's domain model and error types.
//! The engine and any UI-facing client agree on these JSON shapes.

/// Error types and handling
pub mod errors;

/// Directive, task, agent and log types
pub mod types;

// Re-export commonly used types
pub use errors::{DlxErrorExt, EngineError};
pub use types::{
    Agent, AgentStatus, AiService, ChronicleLog, ChronicleLogType, CodeReviewItem,
    ComplianceAlert, DeploymentStatus, Directive, DirectiveCategory, DirectivePriority,
    DirectiveStatus, EmbeddingStatus, KnowledgeFile, KnowledgeFileType, MindMapNode, Position,
    ReviewStatus, Task, TaskStatus,
};
