//! Provides input/output functionality for the file formats used around AMBER simulations.
//!
//! Topologies are read from AMBER `parm7` files or PDB files, coordinates are streamed from
//! AMBER ASCII trajectories or multi-model PDB files, and analysis results are written as CSV
//! tables. All readers share the traits in [`traits`].

pub mod mdcrd;
pub mod parm7;
pub mod pdb;
pub mod results;
pub mod traits;
