use super::atom::Atom;
use super::residue::{Residue, ResidueKind};
use crate::core::selection::AtomMask;
use crate::core::utils::elements;

/// Static description of a molecular system: atoms, their masses and names, and the residues
/// that own them. Coordinates are kept separately in frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    atoms: Vec<Atom>,
    residues: Vec<Residue>,
}

impl Topology {
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn n_residues(&self) -> usize {
        self.residues.len()
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn residue_of(&self, atom_index: usize) -> Option<&Residue> {
        self.atoms
            .get(atom_index)
            .and_then(|atom| self.residues.get(atom.residue_index))
    }

    pub fn masses(&self) -> Vec<f64> {
        self.atoms.iter().map(|a| a.mass).collect()
    }

    /// Returns the indices of the atoms matched by `mask`, in topology order.
    pub fn select(&self, mask: AtomMask) -> Vec<usize> {
        self.atoms
            .iter()
            .enumerate()
            .filter(|(_, atom)| mask.matches(atom))
            .map(|(i, _)| i)
            .collect()
    }

    /// Returns `(first, last)` original residue numbers of each residue kind, or `None` when
    /// the system has no residue of that kind.
    pub fn residue_span(&self, kind: ResidueKind) -> Option<(isize, isize)> {
        let mut matching = self.residues.iter().filter(|r| r.kind() == kind);
        let first = matching.next()?;
        let last = matching.last().unwrap_or(first);
        Some((first.original_id, last.original_id))
    }
}

/// Incrementally assembles a [`Topology`] while a file is read, residue by residue.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    atoms: Vec<Atom>,
    residues: Vec<Residue>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_residue(&mut self, name: &str, original_id: isize, chain_id: char) {
        let first_atom = self.atoms.len();
        self.residues
            .push(Residue::new(name, original_id, chain_id, first_atom));
    }

    /// Appends an atom to the most recently started residue.
    ///
    /// A residue named `UNK` is started implicitly if none exists yet. When `element` is not
    /// given it is inferred from the atom and residue names; when `mass` is not given it is
    /// looked up from the element.
    pub fn add_atom(
        &mut self,
        name: &str,
        element: Option<&str>,
        mass: Option<f64>,
        charge: f64,
        serial: Option<usize>,
    ) -> usize {
        if self.residues.is_empty() {
            self.start_residue("UNK", 1, ' ');
        }
        let residue_index = self.residues.len() - 1;
        let residue_name = self.residues[residue_index].name.clone();

        let index = self.atoms.len();
        let mut atom = Atom::new(name, residue_index);
        atom.element = element
            .map(|e| e.trim().to_ascii_uppercase())
            .filter(|e| !e.is_empty())
            .or_else(|| elements::infer_element(name, &residue_name).map(str::to_string))
            .unwrap_or_default();
        atom.mass = mass
            .or_else(|| elements::mass_of(&atom.element))
            .unwrap_or(0.0);
        atom.charge = charge;
        atom.serial = serial.unwrap_or(index + 1);

        self.atoms.push(atom);
        self.residues[residue_index].atoms.end = index + 1;
        index
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn build(self) -> Topology {
        Topology {
            atoms: self.atoms,
            residues: self
                .residues
                .into_iter()
                .filter(|r| r.n_atoms() > 0)
                .collect(),
        }
        .reindexed()
    }
}

impl Topology {
    fn reindexed(mut self) -> Self {
        for (residue_index, residue) in self.residues.iter().enumerate() {
            for atom_index in residue.atom_indices() {
                self.atoms[atom_index].residue_index = residue_index;
            }
        }
        self
    }
}
