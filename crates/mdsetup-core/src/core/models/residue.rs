use phf::{Set, phf_set};
use std::ops::Range;

static ION_NAMES: Set<&'static str> = phf_set! {
    "Na+", "Cl-", "K+", "NA", "CL", "K", "MG", "Mg+", "CA", "Ca+", "ZN", "Zn+", "Cs+", "Rb+", "Li+",
};

static SOLVENT_NAMES: Set<&'static str> = phf_set! {
    "WAT", "HOH", "TIP3", "TP3", "SOL", "OPC", "SPC",
};

/// Broad classification of residues used when partitioning a solvated system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueKind {
    Solute,
    Ion,
    Solvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub name: String,
    pub original_id: isize, // Residue number as written in the source file
    pub chain_id: char,
    pub(crate) atoms: Range<usize>,
}

impl Residue {
    pub(crate) fn new(name: &str, original_id: isize, chain_id: char, first_atom: usize) -> Self {
        Self {
            name: name.trim().to_string(),
            original_id,
            chain_id,
            atoms: first_atom..first_atom,
        }
    }

    pub fn atom_indices(&self) -> Range<usize> {
        self.atoms.clone()
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn kind(&self) -> ResidueKind {
        if SOLVENT_NAMES.contains(self.name.as_str()) {
            ResidueKind::Solvent
        } else if ION_NAMES.contains(self.name.as_str()) && self.n_atoms() == 1 {
            ResidueKind::Ion
        } else {
            ResidueKind::Solute
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residue_with_atoms(name: &str, n_atoms: usize) -> Residue {
        let mut residue = Residue::new(name, 1, 'A', 10);
        residue.atoms = 10..10 + n_atoms;
        residue
    }

    #[test]
    fn atom_indices_cover_the_owned_range() {
        let residue = residue_with_atoms("ALA", 10);
        assert_eq!(residue.atom_indices(), 10..20);
        assert_eq!(residue.n_atoms(), 10);
    }

    #[test]
    fn water_and_ions_are_classified() {
        assert_eq!(residue_with_atoms("WAT", 3).kind(), ResidueKind::Solvent);
        assert_eq!(residue_with_atoms("HOH", 3).kind(), ResidueKind::Solvent);
        assert_eq!(residue_with_atoms("Na+", 1).kind(), ResidueKind::Ion);
        assert_eq!(residue_with_atoms("Cl-", 1).kind(), ResidueKind::Ion);
        assert_eq!(residue_with_atoms("LYS", 22).kind(), ResidueKind::Solute);
    }

    #[test]
    fn multi_atom_residue_named_like_an_ion_is_solute() {
        assert_eq!(residue_with_atoms("CA", 4).kind(), ResidueKind::Solute);
    }
}
