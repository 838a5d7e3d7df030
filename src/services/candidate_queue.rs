use std::collections::VecDeque;

use crate::models::CandidateRecord;

/// Candidates awaiting a decision, in backend order. Contents change only by
/// a full `load` or by removing the head, so staleness is all-or-nothing.
#[derive(Debug, Default)]
pub struct CandidateQueue {
    items: VecDeque<CandidateRecord>,
    loaded: bool,
}

impl CandidateQueue {
    /// Replaces the contents verbatim. The head (display cursor) becomes the
    /// first element of `items`.
    pub fn load(&mut self, items: Vec<CandidateRecord>) {
        self.items = VecDeque::from(items);
        self.loaded = true;
    }

    pub fn remove_head(&mut self) -> Option<CandidateRecord> {
        self.items.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn head(&self) -> Option<&CandidateRecord> {
        self.items.front()
    }

    /// Whether `id` is still pending a decision.
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|c| c.id == id)
    }

    pub fn items(&self) -> impl Iterator<Item = &CandidateRecord> {
        self.items.iter()
    }
}

#[cfg(test)]
pub(crate) fn candidate(id: &str) -> CandidateRecord {
    CandidateRecord {
        id: id.to_string(),
        first_name: Some(format!("name-{}", id)),
        age: None,
        profile_picture: None,
        distance_to_user: None,
        description: None,
        extra: serde_json::Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(queue: &CandidateQueue) -> Vec<&str> {
        queue.items().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn load_replaces_everything() {
        let mut queue = CandidateQueue::default();
        assert!(!queue.is_loaded());

        queue.load(vec![candidate("c1"), candidate("c2"), candidate("c3")]);
        queue.remove_head();
        queue.load(vec![candidate("c4"), candidate("c2")]);

        assert!(queue.is_loaded());
        assert_eq!(ids(&queue), vec!["c4", "c2"]);
        assert_eq!(queue.head().map(|c| c.id.as_str()), Some("c4"));
        assert!(!queue.contains("c3"));
    }

    #[test]
    fn remove_head_on_empty_is_noop() {
        let mut queue = CandidateQueue::default();
        assert_eq!(queue.remove_head(), None);
        assert!(queue.is_empty());
        assert!(!queue.is_loaded());

        queue.load(vec![candidate("c1")]);
        assert_eq!(queue.remove_head().map(|c| c.id), Some("c1".to_string()));
        assert_eq!(queue.remove_head(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_load_still_marks_loaded() {
        let mut queue = CandidateQueue::default();
        queue.load(Vec::new());
        assert!(queue.is_loaded());
        assert!(queue.is_empty());
    }
}
