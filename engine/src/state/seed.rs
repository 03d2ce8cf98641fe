//! Initial command center contents

use super::CommandState;
use sdk::types::{
    Agent, AgentStatus, AiService, CodeReviewItem, DeploymentStatus, Directive, DirectiveCategory,
    DirectivePriority, DirectiveStatus, EmbeddingStatus, KnowledgeFile, KnowledgeFileType,
    MindMapNode, Position, ReviewStatus, Task, TaskStatus,
};

fn task(id: &str, name: &str, status: TaskStatus) -> Task {
    Task {
        status,
        ..Task::new(id, name)
    }
}

#[allow(clippy::too_many_arguments)]
fn directive(
    id: &str,
    title: &str,
    description: &str,
    category: DirectiveCategory,
    priority: DirectivePriority,
    status: DirectiveStatus,
    flags: (bool, bool),
    tasks: Vec<Task>,
) -> Directive {
    let (api_key_required, deployable) = flags;
    Directive {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category,
        priority,
        status,
        deployment_status: DeploymentStatus::None,
        tasks,
        api_key_required,
        deployable,
    }
}

fn directives() -> Vec<Directive> {
    use DirectiveCategory::*;
    use DirectivePriority::*;
    use TaskStatus::{Completed as Done, Pending as Todo};

    vec![
        directive(
            "genesis-engine",
            "The \"Genesis Engine\" Initiative",
            "Develop a workflow for an \"Orchestrator Agent\" to autonomously generate, review, and deploy projects to Staging based on a simple brief.",
            Visionary,
            High,
            DirectiveStatus::Pending,
            (true, true),
            vec![
                task("ge-1", "Define Orchestrator Agent specs", Todo),
                task("ge-2", "Prototype agent communication protocol", Todo),
                task("ge-3", "Develop deployment script hooks", Todo),
            ],
        ),
        directive(
            "agent-choreography",
            "\"Agent Choreography\" Upgrade",
            "Implement an event-driven system for agents to perform complex, multi-step tasks autonomously, triggered by events from other labs.",
            Priority,
            High,
            DirectiveStatus::Pending,
            (false, false),
            vec![
                task("ac-1", "Design event schema for inter-lab communication", Todo),
                task("ac-2", "Implement pub/sub message bus", Todo),
                task("ac-3", "Test with 3+ agents performing a sequence", Todo),
            ],
        ),
        directive(
            "living-chronicle",
            "\"The Living Chronicle\" (Auto-Documentation)",
            "Create a new \"Chronicle\" lab for the system to auto-document its actions in real-time, creating a transparent, self-aware history.",
            Standard,
            Medium,
            DirectiveStatus::Completed,
            (false, false),
            vec![
                task("lc-1", "Create logging interface", Done),
                task("lc-2", "Integrate logging hooks into all labs", Done),
            ],
        ),
        directive(
            "aura-live-voice",
            "Aura Live Voice Interface (Streaming Upgrade)",
            "Upgrade Aura to a low-latency, streaming voice experience using a Gemini Live API simulation for real-time, two-way conversational audio.",
            Priority,
            High,
            DirectiveStatus::Completed,
            (true, true),
            vec![
                task("al-1", "Integrate Gemini Live API", Done),
                task("al-2", "Build real-time transcription UI", Done),
                task("al-3", "Optimize audio buffer handling", Done),
            ],
        ),
        directive(
            "self-healing",
            "Automated Self-Healing",
            "Empower the System Guardian to autonomously execute pre-defined routines to counteract and resolve predicted system anomalies before they occur.",
            Priority,
            High,
            DirectiveStatus::Pending,
            (false, false),
            vec![
                task("sh-1", "Develop anomaly detection model", Todo),
                task("sh-2", "Create library of self-healing scripts", Todo),
            ],
        ),
        directive(
            "mindmap-ai-ideation",
            "Mind Map AI Ideation Upgrade",
            "Integrate Gemini into the Mind Map to automatically generate clusters of related sub-ideas from a selected node, accelerating creative planning.",
            Standard,
            Medium,
            DirectiveStatus::Completed,
            (true, false),
            vec![
                task("mi-1", "Connect Gemini API to Mind Map", Done),
                task("mi-2", "Implement node generation logic", Done),
            ],
        ),
    ]
}

fn agents() -> Vec<Agent> {
    // Agents that run standing duties rather than directive tasks start Idle
    // so that Executing always points at a directive.
    let mut guardian = Agent::new(
        "sys-guardian",
        "System Guardian",
        "Monitor system stability, predict anomalies, and manage agent performance.",
    );
    guardian.status = AgentStatus::SystemGuardian;

    vec![
        Agent::new(
            "aura-main",
            "Aura (Core)",
            "Primary operator interface for high-level command and control.",
        ),
        guardian,
        Agent::new(
            "compliance-wizard",
            "Compliance Wizard (Grok-1)",
            "Continuously scan Knowledge Base and Staging for TOS & legal compliance issues.",
        ),
        Agent::new(
            "knowledge-retrieval",
            "Knowledge Agent",
            "Perform semantic searches on the Vector DB to provide context-aware information.",
        ),
        Agent::new(
            "crypto-analyst",
            "Crypto Analyst",
            "Monitor and analyze real-time cryptocurrency market data for anomalies.",
        ),
        Agent::new(
            "gui-architect",
            "GUI Architect",
            "Design and prototype React components based on specifications.",
        ),
        Agent::new(
            "code-assembler",
            "Code Assembler",
            "Assemble and structure application code based on components.",
        ),
    ]
}

fn knowledge_files() -> Vec<KnowledgeFile> {
    let file = |id: &str, name: &str, kind, embedding_status| KnowledgeFile {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        embedding_status,
    };

    vec![
        file("kb-1", "ClientBrief_ProjectX.docx", KnowledgeFileType::Doc, EmbeddingStatus::Indexed),
        file("kb-2", "MarketResearch_Q3.pdf", KnowledgeFileType::Pdf, EmbeddingStatus::Indexed),
        file("kb-3", "Financials_2024.xlsx", KnowledgeFileType::Sheet, EmbeddingStatus::Embedding),
        file(
            "kb-4",
            "Project_Pegasus_proprietary.pdf",
            KnowledgeFileType::Pdf,
            EmbeddingStatus::Indexed,
        ),
    ]
}

fn mind_map_nodes() -> Vec<MindMapNode> {
    let node = |id: &str, label: &str, parent: Option<&str>, x: f64, y: f64| MindMapNode {
        id: id.to_string(),
        label: label.to_string(),
        parent_id: parent.map(str::to_string),
        position: Position { x, y },
        is_promoted: false,
        directive_id: None,
        ai_service: None,
    };

    vec![
        node("root", "DLX Command Center", None, 0.0, 0.0),
        node("vision", "Vision & Scope", Some("root"), 200.0, -100.0),
        node("architecture", "System Architecture", Some("root"), 200.0, 100.0),
        MindMapNode {
            is_promoted: true,
            directive_id: Some("mindmap-ai-ideation".to_string()),
            ..node("mindmap-ai-ideation-node", "Mind Map AI Ideation", Some("vision"), 400.0, -150.0)
        },
        node("comms", "AI Communications", Some("architecture"), 400.0, 100.0),
        MindMapNode {
            ai_service: Some(AiService::Gemini),
            ..node("bot-gemini", "Query Gemini", Some("comms"), 600.0, 0.0)
        },
        MindMapNode {
            ai_service: Some(AiService::Grok),
            ..node("bot-grok", "Query Grok", Some("comms"), 600.0, 100.0)
        },
        MindMapNode {
            ai_service: Some(AiService::Copilot),
            ..node("bot-copilot", "Automate with Copilot", Some("comms"), 600.0, 200.0)
        },
    ]
}

/// Populate `state` with the initial data set
pub fn apply(state: &mut CommandState) {
    // The store inserts at the head, so add oldest first
    for directive in directives().into_iter().rev() {
        state.directives.add(directive);
    }
    for agent in agents() {
        state.agents.register(agent);
    }
    for file in knowledge_files() {
        state.knowledge.insert(file);
    }
    for node in mind_map_nodes() {
        state.mind_map.insert(node);
    }
    state.reviews.insert(CodeReviewItem {
        id: "pr-3".to_string(),
        title: "docs: Update knowledge base ingestion pipeline".to_string(),
        author: "Knowledge Agent".to_string(),
        status: ReviewStatus::Merged,
        directive_id: None,
    });
}
