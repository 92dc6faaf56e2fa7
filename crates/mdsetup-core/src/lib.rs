//! # mdsetup Core Library
//!
//! Preparation and post-analysis of AMBER molecular-dynamics simulations.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that file handling, numerical analysis and
//! user-facing procedures stay independent of one another.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Topology`, `Trajectory`, `Table`),
//!   readers and writers for AMBER and PDB files, atom selection masks and geometry helpers.
//!
//! - **[`analysis`]: The Numerical Layer.** Loads trajectories, superimposes frames and computes
//!   fluctuation statistics: the mode-projected RMSF from the mass-weighted covariance matrix,
//!   per-residue atomic fluctuations and the pairwise 2-D RMSD matrix.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built on the two layers below:
//!   scaffolding a simulation directory tree, rendering simulation input files from templates,
//!   running `tleap` to solvate a system and running the fluctuation analysis end to end.

pub mod analysis;
pub mod core;
pub mod workflows;
