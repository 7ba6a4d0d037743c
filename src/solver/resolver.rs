use serde::Serialize;
use tracing::{debug, warn};

use crate::common::{first_conflict, Path, Position};

/// Outcome of [`resolve_conflicts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub first: Path,
    pub second: Path,
    /// Scans performed, never more than the cap.
    pub iterations: usize,
    pub inserted_waits: usize,
    /// False when the cap was reached with a conflict still present.
    pub converged: bool,
}

fn pad_pair(first: &mut Path, second: &mut Path) {
    let length = first.len().max(second.len());
    for path in [first, second] {
        if let Some(&last) = path.last() {
            path.resize(length, last);
        }
    }
}

/// Makes two independently planned paths avoid each other by delaying the
/// second one.
///
/// Both paths are padded to equal length and scanned from step 1. At the first
/// vertex conflict or direct swap, the second path repeats its previous position
/// at that step, shifting the rest of it one step later, and the scan restarts.
/// Diagonal and multi-hop interference is not detected. After
/// `max_iterations` scans the current paths are returned even if they still
/// conflict.
pub fn resolve_conflicts(
    first: &[Position],
    second: &[Position],
    max_iterations: usize,
) -> Resolution {
    let mut first = first.to_vec();
    let mut second = second.to_vec();
    let mut iterations = 0;
    let mut inserted_waits = 0;

    let converged = loop {
        pad_pair(&mut first, &mut second);

        let Some(conflict) = first_conflict(&first, &second) else {
            break true;
        };
        if iterations == max_iterations {
            break false;
        }
        iterations += 1;

        let time_step = conflict.time_step();
        debug!("delay second path at {time_step} for {conflict:?}");
        second.insert(time_step, second[time_step - 1]);
        inserted_waits += 1;
    };

    if !converged {
        warn!("conflict resolution stopped after {iterations} iterations with conflicts left");
    }

    Resolution {
        first,
        second,
        iterations,
        inserted_waits,
        converged,
    }
}
