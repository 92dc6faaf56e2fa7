//! # Workflows Module
//!
//! High-level procedures that tie the [`core`](crate::core) and [`analysis`](crate::analysis)
//! layers together. Each workflow is a single synchronous call that performs one command
//! end to end and reports what it wrote.
//!
//! - **Scaffold** ([`scaffold`]) - the fixed directory tree of a simulation project.
//! - **Simulation files** ([`simfiles`]) - AMBER input files and run scripts rendered from
//!   [`templates`].
//! - **Solvation** ([`solvate`]) - a `tleap` script rendered from a template and executed.
//! - **Trajectory analysis** ([`analyze`]) - fluctuation and 2-D RMSD analyses with result
//!   serialization and structure annotation.
//!
//! Failures a user can recover from by fixing their environment (no AMBER installation, an
//! unknown template, a failing `tleap`) are logged and reported through an outcome value rather
//! than an error.

pub mod analyze;
pub mod error;
pub mod scaffold;
pub mod simfiles;
pub mod solvate;
pub mod templates;
