use std::cmp::Ordering;

use super::Position;

/// Open-list entry shared by both grid searches. The static search keeps
/// `time_step` at zero.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub(crate) struct LowLevelNode {
    pub(crate) position: Position,
    pub(crate) time_step: usize,
    pub(crate) f_cost: usize,
    pub(crate) g_cost: usize,
    // Discovery counter, unique per search.
    pub(crate) order: usize,
    pub(crate) parent: Option<(Position, usize)>,
}

impl Ord for LowLevelNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .cmp(&other.f_cost)
            // Equal f: whichever was discovered first is expanded first.
            .then_with(|| self.order.cmp(&other.order))
    }
}

impl PartialOrd for LowLevelNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
