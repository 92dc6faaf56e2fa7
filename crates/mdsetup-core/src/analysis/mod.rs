//! # Analysis Module
//!
//! Numerical analyses of AMBER trajectories. The [`loader`] turns a topology file and a
//! trajectory file into an in-memory [`Trajectory`](crate::core::models::trajectory::Trajectory);
//! the remaining modules consume it:
//!
//! - [`align`] - mass-weighted superposition of every frame onto a reference frame
//! - [`fluctuation`] - mass-weighted covariance, its eigenmodes and mode-projected fluctuations
//! - [`atomic_fluct`] - per-residue r.m.s. fluctuations for predefined atom selections
//! - [`rms2d`] - pairwise best-fit RMSD between all frames
//!
//! Everything here runs single-threaded and synchronously; long loops report through
//! [`progress::ProgressReporter`].

pub mod align;
pub mod atomic_fluct;
pub mod error;
pub mod fluctuation;
pub mod loader;
pub mod progress;
pub mod rms2d;
