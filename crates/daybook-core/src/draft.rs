use crate::task::Priority;

/// State of the "create new task" form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub name: String,
    pub body: String,
    pub priority: Priority,
}

impl TaskDraft {
    pub fn new(priority: Priority) -> Self {
        Self {
            name: String::new(),
            body: String::new(),
            priority,
        }
    }

    pub fn cycle_priority(&mut self) -> Priority {
        self.priority = self.priority.cycle();
        self.priority
    }

    pub fn is_submittable(&self) -> bool {
        !self.name.trim().is_empty() && !self.body.trim().is_empty()
    }

    /// Empties the text fields; the selected priority stays.
    pub fn clear(&mut self) {
        self.name.clear();
        self.body.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_starts_at_highest_number_and_wraps() {
        let mut draft = TaskDraft::default();
        assert_eq!(draft.priority, Priority::MAX);
        assert_eq!(draft.cycle_priority(), Priority::MIN);
        assert_eq!(draft.cycle_priority().value(), 1);
    }

    #[test]
    fn blank_fields_are_not_submittable() {
        let mut draft = TaskDraft::new(Priority::MIN);
        assert!(!draft.is_submittable());
        draft.name = "Buy milk".to_string();
        draft.body = "   ".to_string();
        assert!(!draft.is_submittable());
        draft.body = "2%".to_string();
        assert!(draft.is_submittable());

        draft.clear();
        assert!(draft.name.is_empty() && draft.body.is_empty());
        assert_eq!(draft.priority, Priority::MIN);
    }
}
