//! Compliance Scanner
//!
//! Periodic sweep over the knowledge base and the staging area (deployed
//! directives) for forbidden keywords.
//!
//! # Alert identity
//!
//! Alert ids are derived from what was found and where, never from time:
//! `kb-{fileId}-{keyword}` and `staging-{directiveId}-{keyword}`. A finding
//! already present in the active set is not raised again. Acknowledged
//! alerts leave the active set, so the next sweep raises them again if the
//! offending content is still there.

use chrono::{SecondsFormat, Utc};
use sdk::types::{ComplianceAlert, DeploymentStatus, Directive, KnowledgeFile};
use std::collections::HashSet;

/// Alert id for a keyword found in a knowledge file name
pub fn kb_alert_id(file_id: &str, keyword: &str) -> String {
    format!("kb-{}-{}", file_id, keyword)
}

/// Alert id for a keyword found in a deployed directive description
pub fn staging_alert_id(directive_id: &str, keyword: &str) -> String {
    format!("staging-{}-{}", directive_id, keyword)
}

/// Keyword matcher producing deduplicated alerts
#[derive(Debug, Clone)]
pub struct ComplianceScanner {
    keywords: Vec<String>,
}

impl ComplianceScanner {
    /// Create a scanner; keywords are matched case-insensitively
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Scan knowledge files and deployed directives
    ///
    /// # Arguments
    /// * `files` - Knowledge base files, matched by name
    /// * `directives` - All directives; only deployed ones are matched, by description
    /// * `active` - Alerts currently raised; findings with these ids are skipped
    ///
    /// # Returns
    /// New alerts only, in discovery order
    pub fn scan(
        &self,
        files: &[KnowledgeFile],
        directives: &[Directive],
        active: &AlertBoard,
    ) -> Vec<ComplianceAlert> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for file in files {
            let name = file.name.to_lowercase();
            for keyword in self.keywords.iter().filter(|k| name.contains(k.as_str())) {
                let id = kb_alert_id(&file.id, keyword);
                if active.contains(&id) || !seen.insert(id.clone()) {
                    continue;
                }
                found.push(ComplianceAlert {
                    id,
                    location: format!("KB: {}", file.name),
                    issue: format!("Potential exposure of \"{}\" data.", keyword),
                    timestamp: timestamp.clone(),
                });
            }
        }

        for directive in directives
            .iter()
            .filter(|d| d.deployment_status == DeploymentStatus::Deployed)
        {
            let description = directive.description.to_lowercase();
            for keyword in self.keywords.iter().filter(|k| description.contains(k.as_str())) {
                let id = staging_alert_id(&directive.id, keyword);
                if active.contains(&id) || !seen.insert(id.clone()) {
                    continue;
                }
                found.push(ComplianceAlert {
                    id,
                    location: format!("Staging: {}", directive.title),
                    issue: format!("Potentially non-compliant term \"{}\" in deployed project.", keyword),
                    timestamp: timestamp.clone(),
                });
            }
        }

        found
    }
}

/// Active compliance alerts, oldest first
#[derive(Debug, Default)]
pub struct AlertBoard {
    alerts: Vec<ComplianceAlert>,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.alerts.iter().any(|a| a.id == id)
    }

    /// Append alerts whose id is not already active
    pub fn extend(&mut self, alerts: impl IntoIterator<Item = ComplianceAlert>) {
        for alert in alerts {
            if !self.contains(&alert.id) {
                self.alerts.push(alert);
            }
        }
    }

    /// Remove an alert; `None` if it was not active
    pub fn acknowledge(&mut self, id: &str) -> Option<ComplianceAlert> {
        let pos = self.alerts.iter().position(|a| a.id == id)?;
        Some(self.alerts.remove(pos))
    }

    pub fn list(&self) -> &[ComplianceAlert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
