//! Groups parsed resource changes into create / update / delete buckets

use super::error::{PlanError, PlanResult};
use super::types::{Action, ChangeSet, ParsedPlan};

/// Partition a parsed plan into a [`ChangeSet`].
///
/// Encounter order is kept within each bucket. A record whose action is
/// [`Action::Unknown`] rejects the whole plan; no partial set is returned.
pub fn classify(plan: ParsedPlan) -> PlanResult<ChangeSet> {
    let mut set = ChangeSet {
        outputs: plan.outputs,
        summary_line: plan.summary_line,
        ..Default::default()
    };

    for resource in plan.resources {
        match resource.action {
            Action::Create => set.created.push(resource),
            Action::Update => set.updated.push(resource),
            Action::Delete => set.destroyed.push(resource),
            Action::Unknown => {
                return Err(PlanError::AmbiguousAction {
                    resource: resource.name,
                });
            }
        }
    }

    Ok(set)
}
