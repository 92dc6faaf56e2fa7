use super::models::atom::Atom;
use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Predefined atom selections accepted by the analysis commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AtomMask {
    /// Alpha carbons (`@CA`).
    CAlpha,
    /// Alpha and beta carbons (`@CA,CB`).
    CAlphaBeta,
    /// Every atom whose name does not start with `H` (`!@H=`).
    Heavy,
    /// Every atom.
    All,
}

static MASK_KEYWORDS: Map<&'static str, AtomMask> = phf_map! {
    "ca" => AtomMask::CAlpha,
    "cab" => AtomMask::CAlphaBeta,
    "heavy" => AtomMask::Heavy,
    "noh" => AtomMask::Heavy,
    "all" => AtomMask::All,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown atom selection '{0}' (expected one of: ca, cab, heavy, noh, all)")]
pub struct UnknownMaskError(pub String);

impl AtomMask {
    /// The atom-mask expression this selection corresponds to.
    pub fn expression(&self) -> &'static str {
        match self {
            AtomMask::CAlpha => "@CA",
            AtomMask::CAlphaBeta => "@CA,CB",
            AtomMask::Heavy => "!@H=",
            AtomMask::All => "",
        }
    }

    /// The keyword used for this selection in file names.
    pub fn key(&self) -> &'static str {
        match self {
            AtomMask::CAlpha => "ca",
            AtomMask::CAlphaBeta => "cab",
            AtomMask::Heavy => "heavy",
            AtomMask::All => "all",
        }
    }

    pub fn matches(&self, atom: &Atom) -> bool {
        match self {
            AtomMask::CAlpha => atom.name == "CA",
            AtomMask::CAlphaBeta => atom.name == "CA" || atom.name == "CB",
            AtomMask::Heavy => !atom.is_hydrogen(),
            AtomMask::All => true,
        }
    }
}

impl FromStr for AtomMask {
    type Err = UnknownMaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MASK_KEYWORDS
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| UnknownMaskError(s.to_string()))
    }
}

impl fmt::Display for AtomMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
