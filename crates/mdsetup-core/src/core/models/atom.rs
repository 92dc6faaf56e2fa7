/// Represents one atom of a topology.
///
/// Atoms carry only static information; coordinates live in the frames of a
/// [`Trajectory`](super::trajectory::Trajectory) and are addressed by the atom's index.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "N", "HB2").
    pub name: String,
    /// The upper-case element symbol (e.g., "C", "NA"); empty when unknown.
    pub element: String,
    /// The atomic mass in g/mol.
    pub mass: f64,
    /// The partial charge in elementary charge units.
    pub charge: f64,
    /// The serial number from the source file, or the 1-based position when absent.
    pub serial: usize,
    /// Index of the residue this atom belongs to.
    pub residue_index: usize,
}

impl Atom {
    pub fn new(name: &str, residue_index: usize) -> Self {
        Self {
            name: name.trim().to_string(),
            element: String::new(),
            mass: 0.0,
            charge: 0.0,
            serial: 0,
            residue_index,
        }
    }

    /// Matches the `@H=` wildcard: any atom whose name starts with `H`.
    pub fn is_hydrogen(&self) -> bool {
        self.name.starts_with('H')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_has_expected_default_fields() {
        let atom = Atom::new(" CA ", 3);
        assert_eq!(atom.name, "CA");
        assert_eq!(atom.residue_index, 3);
        assert_eq!(atom.mass, 0.0);
        assert_eq!(atom.charge, 0.0);
        assert!(atom.element.is_empty());
    }

    #[test]
    fn hydrogen_detection_follows_name_prefix() {
        assert!(Atom::new("HA", 0).is_hydrogen());
        assert!(Atom::new("H", 0).is_hydrogen());
        assert!(!Atom::new("CA", 0).is_hydrogen());
        assert!(!Atom::new("OH", 0).is_hydrogen());
    }
}
