//! Bounded servicing of hardware event queues.

use crate::Error;

/// Bus controller with pending transmit/receive events.
pub trait EventQueue {
    /// Service pending events once, returning how many remain.
    fn events(&mut self) -> usize;
}

/// Service `queue` until it is empty or `limit` iterations have passed.
///
/// Returns the number of iterations used.
pub fn drain_events(
    queue: &mut impl EventQueue,
    limit: usize,
) -> Result<usize, Error> {
    for iteration in 1..=limit {
        if queue.events() == 0 {
            return Ok(iteration);
        }
    }

    Err(Error::DrainLimit { limit })
}
