//! Data models shared by the loaders and the scaling engine.
//!
//! Tables are built once by the readers in [`crate::core::io`] and treated as read-only
//! afterwards. Declaration order is preserved everywhere because the pairing rule and the
//! first-match factor lookup both depend on it.

pub mod fragment;
pub mod monomer;
pub mod polarizability;
