//! Knowledge Base
//!
//! Registry of documents the compliance scanner sweeps by name.

use sdk::types::{EmbeddingStatus, KnowledgeFile, KnowledgeFileType};

#[derive(Debug, Default)]
pub struct KnowledgeBase {
    files: Vec<KnowledgeFile>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file; newly uploaded files start embedding
    pub fn register(&mut self, id: String, name: impl Into<String>, kind: KnowledgeFileType) -> KnowledgeFile {
        let file = KnowledgeFile {
            id,
            name: name.into(),
            kind,
            embedding_status: EmbeddingStatus::Embedding,
        };
        self.files.push(file.clone());
        file
    }

    /// Insert a file exactly as given (seed data)
    pub fn insert(&mut self, file: KnowledgeFile) {
        self.files.push(file);
    }

    pub fn get(&self, id: &str) -> Option<&KnowledgeFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn list(&self) -> &[KnowledgeFile] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_starts_embedding() {
        let mut kb = KnowledgeBase::new();
        let file = kb.register("file-1".to_string(), "notes.docx", KnowledgeFileType::Doc);

        assert_eq!(file.embedding_status, EmbeddingStatus::Embedding);
        assert_eq!(kb.get("file-1").unwrap().name, "notes.docx");
        assert_eq!(kb.list().len(), 1);
    }
}
