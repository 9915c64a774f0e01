//! Presentation-ready orderings of the working set.
//!
//! Everything here is a pure function of its input; nothing talks to the
//! backend.

use chrono::NaiveDate;

use crate::store::WorkingSet;
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityCategory {
    Critical,
    High,
    Elevated,
    Normal,
    Low,
    Minimal,
    Unknown,
}

impl PriorityCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Elevated => "elevated",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Minimal => "minimal",
            Self::Unknown => "unknown",
        }
    }

    /// Chip colour; `None` for values outside the known range.
    pub fn color(self) -> Option<&'static str> {
        match self {
            Self::Critical => Some("red"),
            Self::High => Some("orange"),
            Self::Elevated => Some("yellow"),
            Self::Normal => Some("green"),
            Self::Low => Some("blue"),
            Self::Minimal => Some("purple"),
            Self::Unknown => None,
        }
    }
}

pub fn priority_category(priority: i64) -> PriorityCategory {
    match priority {
        0 => PriorityCategory::Critical,
        1 => PriorityCategory::High,
        2 => PriorityCategory::Elevated,
        3 => PriorityCategory::Normal,
        4 => PriorityCategory::Low,
        5 => PriorityCategory::Minimal,
        _ => PriorityCategory::Unknown,
    }
}

pub fn task_category(task: &Task) -> PriorityCategory {
    priority_category(i64::from(task.priority.value()))
}

fn by_priority(tasks: &[Task], completed: bool) -> Vec<&Task> {
    let mut out: Vec<&Task> = tasks.iter().filter(|t| t.completed == completed).collect();
    // sort_by_key is stable, so equal priorities keep working-set order
    out.sort_by_key(|t| t.priority);
    out
}

pub fn active_tasks(tasks: &[Task]) -> Vec<&Task> {
    by_priority(tasks, false)
}

pub fn completed_tasks(tasks: &[Task]) -> Vec<&Task> {
    by_priority(tasks, true)
}

/// Single-list ordering: open tasks first, then finished ones, each by priority.
pub fn ordered_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut out = active_tasks(tasks);
    out.extend(completed_tasks(tasks));
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns<'a> {
    pub active: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

impl<'a> Columns<'a> {
    pub fn new(set: &'a WorkingSet) -> Self {
        Self {
            active: active_tasks(set.tasks()),
            completed: completed_tasks(set.tasks()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.completed.is_empty()
    }
}

/// Upper-cases the first character of each space-separated word.
pub fn display_title(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}
