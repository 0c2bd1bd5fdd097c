//! # Force Field Module
//!
//! Lennard-Jones records of a structured force-field document.
//!
//! ## Key Components
//!
//! - [`document`] - The [`document::StructuredDocument`] boundary: attribute get/set on named
//!   elements, implemented for XML by [`crate::core::io::xml::XmlDocument`]
//! - [`lj`] - Extraction of atom-type declarations, per-class and per-class-pair LJ records
//! - [`format`] - Fixed-precision number formatting required by simulation engines
//!
//! ## Usage
//!
//! ```ignore
//! use polscale::core::forcefield::lj::LjTables;
//! use polscale::core::io::xml::XmlDocument;
//!
//! let document = XmlDocument::load("field.xml".as_ref())?;
//! let tables = LjTables::extract(&document)?;
//! ```

pub mod document;
pub mod format;
pub mod lj;
