//! # Core Module
//!
//! Fundamental building blocks for fragment-based Lennard-Jones scaling.
//!
//! - **Data Models** ([`models`]) - Atom polarizabilities, monomers, dimers, fragments and fragment pairs
//! - **File I/O** ([`io`]) - Readers for the polarizability, monomer/dimer and fragment tables,
//!   per-fragment structure files, and the XML force-field document
//! - **Force Field Records** ([`forcefield`]) - Lennard-Jones records extracted from a structured
//!   document and the fixed-precision formatting expected by simulation engines

pub mod forcefield;
pub mod io;
pub mod models;
