//! Path Cooldown - Withdraw paths that overlap a just-executed trade
//!
//! Purpose:
//!     After a trade lands, every path sharing most of its pools with the
//!     executed path would quote against reserves that are about to move.
//!     Those paths are parked for a fixed number of loop iterations, then
//!     returned to the active set.
//!
//! Design:
//!     - Overlap: A = pools of the executed path, B = pools of a candidate.
//!       Retire when |A Δ B| <= 0.5 * (|A| + |B|). The executed path itself
//!       (difference 0) always retires.
//!     - Release: entry.iteration + window <= current iteration (default 20)
//!     - Entries are kept in insertion order. Only the head is checked before
//!       a release scan; if the head is not due, nothing is released.
//!     - A path is either active or cooling down, never both

use std::collections::HashSet;
use tracing::{debug, info};

use crate::types::Path;

/// Default cooldown window in loop iterations
pub const DEFAULT_COOLDOWN_ITERATIONS: u64 = 20;

/// A retired path and the iteration it was retired at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownEntry {
    pub path: Path,
    pub iteration: u64,
}

/// True when `a` and `b` overlap enough for `b` to be retired alongside `a`
fn overlaps(a: &HashSet<&str>, b: &HashSet<&str>) -> bool {
    let difference = a.symmetric_difference(b).count();
    // |A Δ B| <= 0.5 * (|A| + |B|), kept in integers
    2 * difference <= a.len() + b.len()
}

/// Split `active` into paths that stay active and cooldown entries for the
/// ones overlapping `executed`.
pub fn retire(executed: &Path, active: Vec<Path>, iteration: u64) -> (Vec<Path>, Vec<CooldownEntry>) {
    let executed_pools = executed.addresses();
    let mut keep = Vec::with_capacity(active.len());
    let mut retired = Vec::new();

    for path in active {
        if overlaps(&executed_pools, &path.addresses()) {
            retired.push(CooldownEntry { path, iteration });
        } else {
            keep.push(path);
        }
    }

    (keep, retired)
}

/// Return due paths and the entries still cooling down.
pub fn release(
    entries: Vec<CooldownEntry>,
    iteration: u64,
    window: u64,
) -> (Vec<Path>, Vec<CooldownEntry>) {
    let due = |entry: &CooldownEntry| entry.iteration.saturating_add(window) <= iteration;

    match entries.first() {
        Some(head) if due(head) => {}
        _ => return (Vec::new(), entries),
    }

    let mut released = Vec::new();
    let mut remaining = Vec::new();
    for entry in entries {
        if due(&entry) {
            released.push(entry.path);
        } else {
            remaining.push(entry);
        }
    }
    (released, remaining)
}

/// Cooldown collection owned by the arbitrage loop
#[derive(Debug)]
pub struct PathCooldown {
    entries: Vec<CooldownEntry>,
    window: u64,
}

impl PathCooldown {
    pub fn new(window: u64) -> Self {
        Self {
            entries: Vec::new(),
            window,
        }
    }

    /// Move every active path overlapping `executed` into cooldown.
    /// Returns the number of paths retired.
    pub fn retire(&mut self, executed: &Path, active: &mut Vec<Path>, iteration: u64) -> usize {
        let (keep, retired) = retire(executed, std::mem::take(active), iteration);
        *active = keep;

        let count = retired.len();
        for entry in &retired {
            debug!("Path cooled down at iteration {}: {}", iteration, entry.path);
        }
        self.entries.extend(retired);

        info!(
            "Retired {} path(s) overlapping {} | active={} cooling={}",
            count,
            executed,
            active.len(),
            self.entries.len()
        );
        count
    }

    /// Move due paths back into `active`. Returns the number released.
    pub fn release(&mut self, active: &mut Vec<Path>, iteration: u64) -> usize {
        let (released, remaining) = release(std::mem::take(&mut self.entries), iteration, self.window);
        self.entries = remaining;

        let count = released.len();
        if count > 0 {
            info!(
                "Released {} path(s) from cooldown at iteration {} | cooling={}",
                count,
                iteration,
                self.entries.len()
            );
        }
        active.extend(released);
        count
    }

    pub fn entries(&self) -> &[CooldownEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window(&self) -> u64 {
        self.window
    }
}

impl Default for PathCooldown {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_ITERATIONS)
    }
}
