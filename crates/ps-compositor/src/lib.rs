//! # ps-compositor
//!
//! Guest-side image handling: the pending-selection set and the overlay
//! frame compositing that turns a selected photo into the file the
//! submission queue uploads.

pub mod frame;
pub mod loader;

pub use frame::{apply_frame, prepare, JPEG_QUALITY};
pub use loader::PendingSet;
