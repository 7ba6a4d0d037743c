use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::Position;

/// A claim on the grid, held at one time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reservation {
    Vertex(Position),
    /// Traversal from `from` to `to`, arriving at the time step it is held at.
    Edge { from: Position, to: Position },
}

/// Time step to claimed vertices and edges. Within one planning run entries are
/// only ever added: agents committed earlier stay fixed obstacles for every
/// agent planned after them.
#[derive(Debug, Clone, Default)]
pub struct ReservationTable {
    // Each claim remembers the agent that made it first.
    buckets: BTreeMap<usize, BTreeMap<Reservation, usize>>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns true when another agent already holds the claim.
    fn claim(&mut self, time_step: usize, reservation: Reservation, agent: usize) -> bool {
        let owner = *self
            .buckets
            .entry(time_step)
            .or_default()
            .entry(reservation)
            .or_insert(agent);
        owner != agent
    }

    /// Commits `path` (indexed from time 0) for `agent`: a vertex claim per step,
    /// an edge claim per arrival, and the final cell for `hold_time` more steps.
    ///
    /// Claims already held by another agent are left untouched; their number is
    /// returned.
    pub fn reserve_path(&mut self, agent: usize, path: &[Position], hold_time: usize) -> usize {
        let Some(&last) = path.last() else {
            return 0;
        };

        let mut contended = 0;
        for (time_step, &position) in path.iter().enumerate() {
            if self.claim(time_step, Reservation::Vertex(position), agent) {
                trace!("agent {agent} contends vertex {position:?} at {time_step}");
                contended += 1;
            }
            if time_step > 0 {
                let edge = Reservation::Edge {
                    from: path[time_step - 1],
                    to: position,
                };
                if self.claim(time_step, edge, agent) {
                    contended += 1;
                }
            }
        }

        for time_step in path.len()..path.len() + hold_time {
            if self.claim(time_step, Reservation::Vertex(last), agent) {
                trace!("agent {agent} contends parking cell {last:?} at {time_step}");
                contended += 1;
            }
        }

        debug!(
            "agent {agent} reserved {} steps, holding {last:?} for {hold_time}, contended {contended}",
            path.len()
        );
        contended
    }

    pub fn is_reserved(&self, position: Position, time_step: usize) -> bool {
        self.owner(&Reservation::Vertex(position), time_step)
            .is_some()
    }

    pub fn is_edge_reserved(&self, from: Position, to: Position, time_step: usize) -> bool {
        self.owner(&Reservation::Edge { from, to }, time_step)
            .is_some()
    }

    pub fn owner(&self, reservation: &Reservation, time_step: usize) -> Option<usize> {
        self.buckets
            .get(&time_step)
            .and_then(|bucket| bucket.get(reservation))
            .copied()
    }

    /// Number of time steps holding at least one claim.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Latest time step holding a claim.
    pub fn last_time_step(&self) -> Option<usize> {
        self.buckets.keys().next_back().copied()
    }

    /// `(time_step, reservation, owner)` in time order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Reservation, usize)> + '_ {
        self.buckets.iter().flat_map(|(&time_step, bucket)| {
            bucket
                .iter()
                .map(move |(reservation, &owner)| (time_step, reservation, owner))
        })
    }
}
