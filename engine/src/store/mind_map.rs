//! Mind Map
//!
//! Ideation nodes laid out on a 2D canvas. A node can be promoted into a
//! directive exactly once, and can be expanded with AI generated child ideas.

use sdk::types::{AiService, MindMapNode, Position};
use serde::Deserialize;
use thiserror::Error;

/// Distance between a parent and its generated children
const IDEATION_RADIUS: f64 = 200.0;

/// Task plan given to every directive promoted from the mind map
pub const PROMOTED_TASK_PLAN: [&str; 4] = [
    "Research and Planning",
    "Component Prototyping",
    "Code Assembly",
    "Final Review",
];

#[derive(Debug, Default)]
pub struct MindMap {
    nodes: Vec<MindMapNode>,
}

impl MindMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node exactly as given (seed data)
    pub fn insert(&mut self, node: MindMapNode) {
        self.nodes.push(node);
    }

    /// Add a fresh, unpromoted node
    pub fn add_node(
        &mut self,
        id: String,
        label: impl Into<String>,
        parent_id: Option<String>,
        position: Position,
        ai_service: Option<AiService>,
    ) -> MindMapNode {
        let node = MindMapNode {
            id,
            label: label.into(),
            parent_id,
            position,
            is_promoted: false,
            directive_id: None,
            ai_service,
        };
        self.nodes.push(node.clone());
        node
    }

    /// Attach generated ideas to `parent_id`, spread evenly on a circle
    ///
    /// `ids` and `labels` are zipped; extra entries in either are ignored.
    pub fn add_children(&mut self, parent_id: &str, ids: Vec<String>, labels: Vec<String>) -> Vec<MindMapNode> {
        let Some(center) = self.get(parent_id).map(|n| n.position) else {
            return Vec::new();
        };

        let count = ids.len().min(labels.len());
        let children: Vec<MindMapNode> = ids
            .into_iter()
            .zip(labels)
            .enumerate()
            .map(|(i, (id, label))| {
                let angle = 2.0 * std::f64::consts::PI * i as f64 / count as f64;
                MindMapNode {
                    id,
                    label,
                    parent_id: Some(parent_id.to_string()),
                    position: Position {
                        x: center.x + IDEATION_RADIUS * angle.cos(),
                        y: center.y + IDEATION_RADIUS * angle.sin(),
                    },
                    is_promoted: false,
                    directive_id: None,
                    ai_service: None,
                }
            })
            .collect();

        self.nodes.extend(children.iter().cloned());
        children
    }

    /// Link a node to the directive created from it
    pub fn mark_promoted(&mut self, node_id: &str, directive_id: &str) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == node_id) {
            Some(node) => {
                node.is_promoted = true;
                node.directive_id = Some(directive_id.to_string());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&MindMapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn list(&self) -> &[MindMapNode] {
        &self.nodes
    }
}

#[derive(Deserialize)]
struct IdeationResponse {
    ideas: Vec<String>,
}

/// Why a model answer could not be turned into child nodes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdeationError {
    /// The answer is not JSON at all
    #[error("Could not parse AI response.")]
    Unparseable,
    /// JSON without a usable `ideas` array
    #[error("Received an invalid response from the AI.")]
    InvalidResponse,
}

/// Prompt asking the model for sub-ideas of a node, answered as JSON
pub fn ideation_prompt(label: &str) -> String {
    format!(
        "Brainstorm 5 brief, actionable sub-ideas related to: \"{}\". \
         Respond with a JSON object with a single key \"ideas\" which is an array of strings.",
        label
    )
}

/// Extract the idea list from a model answer
///
/// Blank ideas are dropped. The result is never empty.
pub fn parse_ideas(text: &str) -> Result<Vec<String>, IdeationError> {
    let value: serde_json::Value =
        serde_json::from_str(text.trim()).map_err(|_| IdeationError::Unparseable)?;
    let parsed: IdeationResponse =
        serde_json::from_value(value).map_err(|_| IdeationError::InvalidResponse)?;

    let ideas: Vec<String> = parsed
        .ideas
        .into_iter()
        .map(|idea| idea.trim().to_string())
        .filter(|idea| !idea.is_empty())
        .collect();
    if ideas.is_empty() {
        return Err(IdeationError::InvalidResponse);
    }
    Ok(ideas)
}
