//! Step predicates the slate views use to stage their mock content.

/// True once the sequence has reached `at`.
pub fn revealed(step: u32, at: u32) -> bool {
    step >= at
}

/// True while `from <= step < until`, e.g. a typing indicator that disappears
/// when the message is sent.
pub fn revealed_between(step: u32, from: u32, until: u32) -> bool {
    step >= from && step < until
}

/// Status of a workflow node that lights up at `node_step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum NodeStatus {
    Pending,
    Active,
    Completed,
}

impl NodeStatus {
    pub fn for_step(step: u32, node_step: u32) -> Self {
        match step.cmp(&node_step) {
            std::cmp::Ordering::Less => NodeStatus::Pending,
            std::cmp::Ordering::Equal => NodeStatus::Active,
            std::cmp::Ordering::Greater => NodeStatus::Completed,
        }
    }
}
