//! # Core Module
//!
//! Fundamental building blocks shared by the analysis and workflow layers.
//!
//! - **Molecular Representation** ([`models`]) - Topologies, coordinate frames, trajectories and
//!   labelled result tables
//! - **File I/O** ([`io`]) - AMBER `parm7` topologies, ASCII trajectories, PDB files and the CSV
//!   result writer
//! - **Atom Selection** ([`selection`]) - The fixed set of atom masks used by the analysis commands
//! - **Utilities** ([`utils`]) - Element masses and coordinate geometry

pub mod io;
pub mod models;
pub mod selection;
pub mod utils;
