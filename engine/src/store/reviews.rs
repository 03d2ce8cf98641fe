//! Review Board
//!
//! Code review items opened when a directive's task plan finishes. Approval
//! of a review is what starts a deployment.

use sdk::types::{CodeReviewItem, ReviewStatus};

/// Author recorded on every generated review
pub const REVIEW_AUTHOR: &str = "Orchestrator Agent";

/// Review id for a directive
pub fn review_id(directive_id: &str) -> String {
    format!("pr-{}", directive_id)
}

#[derive(Debug, Default)]
pub struct ReviewBoard {
    reviews: Vec<CodeReviewItem>,
}

impl ReviewBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-existing review (seed data)
    pub fn insert(&mut self, review: CodeReviewItem) {
        self.reviews.insert(0, review);
    }

    /// Open the review for a directive, returning its id
    ///
    /// Reopens the existing item if the directive already has one.
    pub fn open_for(&mut self, directive_id: &str, directive_title: &str) -> String {
        let id = review_id(directive_id);
        let title = format!("feat: Implement \"{}\"", directive_title);

        match self.reviews.iter_mut().find(|r| r.id == id) {
            Some(existing) => {
                existing.status = ReviewStatus::Open;
                existing.title = title;
            }
            None => self.reviews.insert(
                0,
                CodeReviewItem {
                    id: id.clone(),
                    title,
                    author: REVIEW_AUTHOR.to_string(),
                    status: ReviewStatus::Open,
                    directive_id: Some(directive_id.to_string()),
                },
            ),
        }

        id
    }

    pub fn get(&self, id: &str) -> Option<&CodeReviewItem> {
        self.reviews.iter().find(|r| r.id == id)
    }

    pub fn set_status(&mut self, id: &str, status: ReviewStatus) -> bool {
        match self.reviews.iter_mut().find(|r| r.id == id) {
            Some(review) => {
                review.status = status;
                true
            }
            None => false,
        }
    }

    /// All reviews, most recent first
    pub fn list(&self) -> &[CodeReviewItem] {
        &self.reviews
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_for_directive() {
        let mut board = ReviewBoard::new();
        let id = board.open_for("genesis", "Genesis Engine");

        let review = board.get(&id).unwrap();
        assert_eq!(id, "pr-genesis");
        assert_eq!(review.title, "feat: Implement \"Genesis Engine\"");
        assert_eq!(review.author, REVIEW_AUTHOR);
        assert_eq!(review.status, ReviewStatus::Open);
        assert_eq!(review.directive_id.as_deref(), Some("genesis"));
    }

    #[test]
    fn test_reopen_keeps_single_item() {
        let mut board = ReviewBoard::new();
        let id = board.open_for("d", "D");
        board.set_status(&id, ReviewStatus::Closed);
        board.open_for("d", "D");

        assert_eq!(board.list().len(), 1);
        assert_eq!(board.get(&id).unwrap().status, ReviewStatus::Open);
    }
}
