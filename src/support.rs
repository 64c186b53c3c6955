//! Supporting utilities used by the mesh and solver modules.
//!
//! - [`constraint`]: Numeric invariants (strict positivity, non-negativity)
//!   enforced at construction time, used to reject non-physical mesh input.
//! - [`units`]: Extensions to [`uom`] for quantities this crate needs that
//!   the library does not provide.

pub mod constraint;
pub mod units;
