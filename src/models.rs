//! Public model adapters.
//!
//! The computational core of this crate (mesh assembly, system building,
//! solving) lives in [`crate::mesh`] and [`crate::solver`]. The adapters
//! here are thin [`twine_core::Model`] implementations over that core, so a
//! conduction solve can be composed with other models: the adapter builds
//! the mesh from its input, delegates, and wraps the result in typed
//! quantities.

pub mod conduction;
