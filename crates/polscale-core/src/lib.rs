//! # polscale Core Library
//!
//! Prepares Lennard-Jones parameters for polarizable force fields by scaling the
//! well depth of fragment-pair interactions, compensating for the induction energy that
//! a non-polarizable parameterisation already folds into epsilon.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (atom types, monomers, dimers,
//!   fragments), parsers for the plain-text input tables and structure files, and the
//!   Lennard-Jones record model over a structured force-field document.
//!
//! - **[`engine`]: The Logic Core.** Builds the fragment graph, derives interacting
//!   fragment pairs, predicts scaling factors and rewrites the Lennard-Jones records.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into a single
//!   scaling pass and produces a report of what was done.

pub mod core;
pub mod engine;
pub mod workflows;
