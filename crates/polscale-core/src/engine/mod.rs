//! # Engine Module
//!
//! The scaling engine: from validated tables to rewritten Lennard-Jones records.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Input paths, factor source and sigma-scaling directive
//! - **Error Handling** ([`error`]) - Engine error type and the error kinds callers branch on
//! - **Fragment Graph** ([`graph`]) - Fragments and the gated derivation of interacting pairs
//! - **Prediction** ([`predictor`]) - Empirical scaling factors from polarizabilities,
//!   charges, dipoles and distances
//! - **Scaling** ([`scaler`]) - First-match factor lookup per LJ record and fixed-precision rewrite
//! - **Coverage** ([`coverage`]) - Non-fatal cross-check between force-field classes and fragments
//!
//! The pass is single-shot: tables are built once and only read afterwards. Per-record
//! factor resolution is independent across records and runs in parallel when the
//! `parallel` feature is enabled.

pub mod config;
pub mod coverage;
pub mod error;
pub mod graph;
pub mod predictor;
pub mod scaler;
