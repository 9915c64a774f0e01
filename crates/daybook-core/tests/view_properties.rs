use std::collections::{HashMap, HashSet};

use daybook_core::task::Task;
use daybook_core::view::{
    PriorityCategory, active_tasks, completed_tasks, ordered_tasks, priority_category,
};
use daybook_shared::TaskDto;
use proptest::prelude::*;

fn working_set_strategy() -> impl Strategy<Value = Vec<Task>> {
    proptest::collection::vec((0i8..=5, any::<bool>()), 0..48).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(idx, (priority, completed))| {
                Task::try_from(TaskDto {
                    key: format!("t{idx}"),
                    name: format!("task {idx}"),
                    body: "notes".to_string(),
                    priority,
                    date: "2026-10-16".to_string(),
                    completed,
                })
                .expect("generated task is valid")
            })
            .collect()
    })
}

fn positions(tasks: &[Task]) -> HashMap<String, usize> {
    tasks
        .iter()
        .enumerate()
        .map(|(idx, task)| (task.key.to_string(), idx))
        .collect()
}

fn assert_priority_then_input_order(
    column: &[&Task],
    positions: &HashMap<String, usize>,
) -> Result<(), TestCaseError> {
    for pair in column.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        prop_assert!(a.priority <= b.priority);
        if a.priority == b.priority {
            prop_assert!(positions[a.key.as_str()] < positions[b.key.as_str()]);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn columns_cover_the_set_without_overlap(tasks in working_set_strategy()) {
        let active: HashSet<String> =
            active_tasks(&tasks).iter().map(|t| t.key.to_string()).collect();
        let completed: HashSet<String> =
            completed_tasks(&tasks).iter().map(|t| t.key.to_string()).collect();
        let all: HashSet<String> = tasks.iter().map(|t| t.key.to_string()).collect();

        prop_assert!(active.is_disjoint(&completed));
        let union: HashSet<String> = active.union(&completed).cloned().collect();
        prop_assert_eq!(union, all);
        prop_assert_eq!(ordered_tasks(&tasks).len(), tasks.len());
    }

    #[test]
    fn columns_sort_by_priority_and_keep_input_order_for_ties(tasks in working_set_strategy()) {
        let positions = positions(&tasks);

        let active = active_tasks(&tasks);
        prop_assert!(active.iter().all(|t| !t.completed));
        assert_priority_then_input_order(&active, &positions)?;

        let completed = completed_tasks(&tasks);
        prop_assert!(completed.iter().all(|t| t.completed));
        assert_priority_then_input_order(&completed, &positions)?;
    }

    #[test]
    fn values_outside_zero_to_five_are_unknown(
        value in prop_oneof![i64::MIN..0i64, 6i64..=i64::MAX]
    ) {
        prop_assert_eq!(priority_category(value), PriorityCategory::Unknown);
        prop_assert_eq!(priority_category(value).color(), None);
    }

    #[test]
    fn values_inside_zero_to_five_have_a_colour(value in 0i64..=5) {
        prop_assert_ne!(priority_category(value), PriorityCategory::Unknown);
        prop_assert!(priority_category(value).color().is_some());
    }
}
