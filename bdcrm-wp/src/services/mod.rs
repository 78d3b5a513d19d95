//! Engine services
//!
//! Read path ([`hydrator`]) and write path ([`recompute`]) are deliberately
//! split: hydration never persists anything, and the derived phase total is
//! only ever written by the item write path.

pub mod hydrator;
pub mod recompute;

pub use hydrator::hydrate;
pub use recompute::{
    advance_phase_status, create_item, delete_item, update_item, update_phase_schedule,
};
