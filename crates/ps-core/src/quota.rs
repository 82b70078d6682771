//! Pre-flight quota check for guest upload batches.
//!
//! The check-then-act sequence (read counter, upload N files, bump counter)
//! has no cross-session mutual exclusion: two guests near the limit can both
//! pass the guard and jointly overshoot it. That race is an accepted
//! inconsistency of the design; the guard only rules on the counter value it
//! was handed.

use crate::error::{AppError, Result};
use crate::models::Event;

/// Admits a batch of `batch_size` uploads iff `current + batch_size <= limit`.
/// Rejection is all-or-nothing and reports how many slots remain.
pub fn admit(current: i64, limit: i64, batch_size: usize) -> Result<()> {
    let batch = batch_size as i64;
    if current + batch > limit {
        return Err(AppError::QuotaExceeded {
            remaining: (limit - current).max(0),
        });
    }
    Ok(())
}

/// Convenience wrapper reading the counter and limit off a freshly loaded event.
pub fn admit_batch(event: &Event, batch_size: usize) -> Result<()> {
    admit(event.photo_count, event.photo_limit, batch_size)
}
