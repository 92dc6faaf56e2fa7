use phf::{Map, phf_map};

/// Standard atomic weights (g/mol) keyed by upper-case element symbol.
#[rustfmt::skip]
pub static ATOMIC_MASSES: Map<&'static str, f64> = phf_map! {
    "H"  => 1.008,   "HE" => 4.0026,
    "LI" => 6.94,    "BE" => 9.0122,  "B"  => 10.81,   "C"  => 12.011,
    "N"  => 14.007,  "O"  => 15.999,  "F"  => 18.998,  "NE" => 20.180,
    "NA" => 22.990,  "MG" => 24.305,  "AL" => 26.982,  "SI" => 28.085,
    "P"  => 30.974,  "S"  => 32.06,   "CL" => 35.45,   "AR" => 39.948,
    "K"  => 39.098,  "CA" => 40.078,  "MN" => 54.938,  "FE" => 55.845,
    "CO" => 58.933,  "NI" => 58.693,  "CU" => 63.546,  "ZN" => 65.38,
    "SE" => 78.971,  "BR" => 79.904,  "RB" => 85.468,  "SR" => 87.62,
    "CD" => 112.41,  "I"  => 126.90,  "CS" => 132.91,  "BA" => 137.33,
    "HG" => 200.59,
};

/// Element symbols keyed by atomic number, as stored in `ATOMIC_NUMBER` sections.
#[rustfmt::skip]
pub static SYMBOLS_BY_NUMBER: Map<u32, &'static str> = phf_map! {
    1u32 => "H",   2u32 => "HE",
    3u32 => "LI",  4u32 => "BE",  5u32 => "B",   6u32 => "C",
    7u32 => "N",   8u32 => "O",   9u32 => "F",   10u32 => "NE",
    11u32 => "NA", 12u32 => "MG", 13u32 => "AL", 14u32 => "SI",
    15u32 => "P",  16u32 => "S",  17u32 => "CL", 18u32 => "AR",
    19u32 => "K",  20u32 => "CA", 25u32 => "MN", 26u32 => "FE",
    27u32 => "CO", 28u32 => "NI", 29u32 => "CU", 30u32 => "ZN",
    34u32 => "SE", 35u32 => "BR", 37u32 => "RB", 38u32 => "SR",
    48u32 => "CD", 53u32 => "I",  55u32 => "CS", 56u32 => "BA",
    80u32 => "HG",
};

pub fn mass_of(symbol: &str) -> Option<f64> {
    ATOMIC_MASSES.get(symbol.to_ascii_uppercase().as_str()).copied()
}

pub fn symbol_for_atomic_number(number: u32) -> Option<&'static str> {
    SYMBOLS_BY_NUMBER.get(&number).copied()
}

/// Guesses the element of an atom from its name when the file carries no element column.
///
/// Two-letter elements are only recognized for single-atom residues whose name matches the
/// atom name (ions such as `NA`, `CL`, `ZN`), so that `CA` in an amino acid stays carbon.
pub fn infer_element(atom_name: &str, residue_name: &str) -> Option<&'static str> {
    let letters: String = atom_name
        .trim()
        .chars()
        .skip_while(|c| c.is_ascii_digit())
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();
    if letters.is_empty() {
        return None;
    }

    let residue = residue_name
        .trim()
        .trim_end_matches(['+', '-'])
        .to_ascii_uppercase();
    if letters.len() >= 2 && residue == letters {
        if let Some((symbol, _)) = ATOMIC_MASSES.get_entry(letters.as_str()) {
            return Some(*symbol);
        }
    }

    ATOMIC_MASSES
        .get_entry(&letters[..1])
        .map(|(symbol, _)| *symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_lookup_is_case_insensitive() {
        assert_eq!(mass_of("c"), Some(12.011));
        assert_eq!(mass_of("Cl"), Some(35.45));
        assert_eq!(mass_of("Xx"), None);
    }

    #[test]
    fn atomic_numbers_map_to_symbols() {
        assert_eq!(symbol_for_atomic_number(1), Some("H"));
        assert_eq!(symbol_for_atomic_number(16), Some("S"));
        assert_eq!(symbol_for_atomic_number(0), None);
    }

    #[test]
    fn alpha_carbon_is_inferred_as_carbon() {
        assert_eq!(infer_element("CA", "ALA"), Some("C"));
        assert_eq!(infer_element("HB2", "SER"), Some("H"));
        assert_eq!(infer_element("1HG1", "VAL"), Some("H"));
        assert_eq!(infer_element("OXT", "GLY"), Some("O"));
    }

    #[test]
    fn ions_are_inferred_from_matching_residue_names() {
        assert_eq!(infer_element("Na+", "Na+"), Some("NA"));
        assert_eq!(infer_element("CL", "CL"), Some("CL"));
        assert_eq!(infer_element("ZN", "ZN"), Some("ZN"));
    }

    #[test]
    fn names_without_letters_yield_none() {
        assert_eq!(infer_element("123", "UNK"), None);
        assert_eq!(infer_element("", "UNK"), None);
    }
}
