use crate::core::io::traits::TopologyFile;
use crate::core::models::topology::{Topology, TopologyBuilder};
use crate::core::utils::elements;
use std::collections::HashMap;
use std::io::{self, BufRead};
use thiserror::Error;

/// Conversion factor between AMBER internal charge units and elementary charges.
const AMBER_CHARGE_SCALE: f64 = 18.2223;

const POINTER_NATOM: usize = 0;
const POINTER_NRES: usize = 11;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: Parm7ParseErrorKind,
    },
    #[error("Missing required section: %FLAG {0}")]
    MissingSection(String),
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

#[derive(Debug, Error)]
pub enum Parm7ParseErrorKind {
    #[error("Unsupported %FORMAT specifier '{0}'")]
    InvalidFormat(String),
    #[error("%FORMAT line appears before any %FLAG line")]
    FormatOutsideSection,
    #[error("Section {section} has a %FORMAT of the wrong kind")]
    UnexpectedFieldKind { section: String },
    #[error("Section {section} has no %FORMAT line")]
    MissingFormat { section: String },
    #[error("Invalid integer in section {section} (value: '{value}')")]
    InvalidInt { section: String, value: String },
    #[error("Invalid float in section {section} (value: '{value}')")]
    InvalidFloat { section: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Int,
    Float,
}

/// A Fortran edit descriptor such as `(10I8)` or `(5E16.8)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FortranFormat {
    kind: FieldKind,
    width: usize,
}

impl FortranFormat {
    fn parse(spec: &str) -> Option<Self> {
        let inner = spec.trim().trim_start_matches('(').trim_end_matches(')');
        let kind_pos = inner.find(|c: char| c.is_ascii_alphabetic())?;
        let kind = match inner[kind_pos..].chars().next()?.to_ascii_uppercase() {
            'A' => FieldKind::Text,
            'I' => FieldKind::Int,
            'E' | 'F' | 'D' | 'G' => FieldKind::Float,
            _ => return None,
        };
        let width: usize = inner[kind_pos + 1..]
            .split('.')
            .next()?
            .parse()
            .ok()?;
        (width > 0).then_some(Self { kind, width })
    }
}

#[derive(Debug)]
struct Section {
    line: usize,
    format: Option<FortranFormat>,
    lines: Vec<String>,
}

impl Section {
    fn fields(&self, name: &str) -> Result<(FortranFormat, Vec<&str>), TopologyError> {
        let format = self.format.ok_or_else(|| TopologyError::Parse {
            line: self.line,
            kind: Parm7ParseErrorKind::MissingFormat {
                section: name.to_string(),
            },
        })?;
        let mut fields = Vec::new();
        for line in &self.lines {
            let mut start = 0;
            while start < line.len() {
                let end = (start + format.width).min(line.len());
                let field = line.get(start..end).unwrap_or("").trim();
                if !field.is_empty() {
                    fields.push(field);
                }
                start = end;
            }
        }
        Ok((format, fields))
    }

    fn typed_fields(&self, name: &str, kind: FieldKind) -> Result<Vec<&str>, TopologyError> {
        let (format, fields) = self.fields(name)?;
        if format.kind != kind {
            return Err(TopologyError::Parse {
                line: self.line,
                kind: Parm7ParseErrorKind::UnexpectedFieldKind {
                    section: name.to_string(),
                },
            });
        }
        Ok(fields)
    }
}

struct Sections(HashMap<String, Section>);

impl Sections {
    fn get(&self, name: &str) -> Option<&Section> {
        self.0.get(name)
    }

    fn require(&self, name: &str) -> Result<&Section, TopologyError> {
        self.get(name)
            .ok_or_else(|| TopologyError::MissingSection(name.to_string()))
    }

    fn strings(&self, name: &str) -> Result<Option<Vec<String>>, TopologyError> {
        let Some(section) = self.get(name) else {
            return Ok(None);
        };
        let (_, fields) = section.fields(name)?;
        Ok(Some(fields.into_iter().map(str::to_string).collect()))
    }

    fn ints(&self, name: &str) -> Result<Option<Vec<i64>>, TopologyError> {
        let Some(section) = self.get(name) else {
            return Ok(None);
        };
        let fields = section.typed_fields(name, FieldKind::Int)?;
        fields
            .into_iter()
            .map(|value| {
                value.parse::<i64>().map_err(|_| TopologyError::Parse {
                    line: section.line,
                    kind: Parm7ParseErrorKind::InvalidInt {
                        section: name.to_string(),
                        value: value.to_string(),
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn floats(&self, name: &str) -> Result<Option<Vec<f64>>, TopologyError> {
        let Some(section) = self.get(name) else {
            return Ok(None);
        };
        let fields = section.typed_fields(name, FieldKind::Float)?;
        fields
            .into_iter()
            .map(|value| {
                value
                    .replace(['D', 'd'], "E")
                    .parse::<f64>()
                    .map_err(|_| TopologyError::Parse {
                        line: section.line,
                        kind: Parm7ParseErrorKind::InvalidFloat {
                            section: name.to_string(),
                            value: value.to_string(),
                        },
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

fn read_sections(reader: &mut impl BufRead) -> Result<Sections, TopologyError> {
    let mut sections: HashMap<String, Section> = HashMap::new();
    let mut current: Option<String> = None;

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = line_num + 1;

        if let Some(rest) = line.strip_prefix("%FLAG") {
            let name = rest.trim().to_string();
            sections.insert(
                name.clone(),
                Section {
                    line: line_num,
                    format: None,
                    lines: Vec::new(),
                },
            );
            current = Some(name);
        } else if let Some(rest) = line.strip_prefix("%FORMAT") {
            let section = current
                .as_ref()
                .and_then(|name| sections.get_mut(name))
                .ok_or(TopologyError::Parse {
                    line: line_num,
                    kind: Parm7ParseErrorKind::FormatOutsideSection,
                })?;
            let format = FortranFormat::parse(rest).ok_or_else(|| TopologyError::Parse {
                line: line_num,
                kind: Parm7ParseErrorKind::InvalidFormat(rest.trim().to_string()),
            })?;
            section.format = Some(format);
        } else if line.starts_with('%') {
            continue;
        } else if let Some(section) = current.as_ref().and_then(|name| sections.get_mut(name)) {
            section.lines.push(line);
        }
    }

    Ok(Sections(sections))
}

fn expect_len<T>(values: &[T], expected: usize, section: &str) -> Result<(), TopologyError> {
    if values.len() < expected {
        return Err(TopologyError::Inconsistency(format!(
            "section {} has {} entries, expected {}",
            section,
            values.len(),
            expected
        )));
    }
    Ok(())
}

/// Reader for AMBER `parm7`/`prmtop` topology files.
pub struct Parm7File;

impl TopologyFile for Parm7File {
    type Error = TopologyError;

    fn read_from(reader: &mut impl BufRead) -> Result<Topology, Self::Error> {
        let sections = read_sections(reader)?;
        sections.require("POINTERS")?;
        sections.require("ATOM_NAME")?;
        sections.require("RESIDUE_LABEL")?;
        sections.require("RESIDUE_POINTER")?;

        let pointers = sections.ints("POINTERS")?.unwrap_or_default();
        expect_len(&pointers, POINTER_NRES + 1, "POINTERS")?;
        let n_atoms = usize::try_from(pointers[POINTER_NATOM]).map_err(|_| {
            TopologyError::Inconsistency(format!("negative atom count {}", pointers[0]))
        })?;
        let n_residues = usize::try_from(pointers[POINTER_NRES]).map_err(|_| {
            TopologyError::Inconsistency(format!("negative residue count {}", pointers[11]))
        })?;

        let names = sections.strings("ATOM_NAME")?.unwrap_or_default();
        expect_len(&names, n_atoms, "ATOM_NAME")?;
        let masses = sections.floats("MASS")?;
        if let Some(masses) = &masses {
            expect_len(masses, n_atoms, "MASS")?;
        }
        let charges = sections.floats("CHARGE")?;
        if let Some(charges) = &charges {
            expect_len(charges, n_atoms, "CHARGE")?;
        }
        let atomic_numbers = sections.ints("ATOMIC_NUMBER")?;

        let labels = sections.strings("RESIDUE_LABEL")?.unwrap_or_default();
        expect_len(&labels, n_residues, "RESIDUE_LABEL")?;
        let residue_pointers = sections.ints("RESIDUE_POINTER")?.unwrap_or_default();
        expect_len(&residue_pointers, n_residues, "RESIDUE_POINTER")?;
        let residue_numbers = sections.ints("RESIDUE_NUMBER")?;
        let chain_ids = sections.strings("RESIDUE_CHAINID")?;

        let mut builder = TopologyBuilder::new();
        for r in 0..n_residues {
            let first = residue_pointers[r] - 1;
            let last = if r + 1 < n_residues {
                residue_pointers[r + 1] - 1
            } else {
                n_atoms as i64
            };
            if first < 0 || last < first || last > n_atoms as i64 {
                return Err(TopologyError::Inconsistency(format!(
                    "residue {} has an invalid atom range {}..{}",
                    r + 1,
                    first + 1,
                    last
                )));
            }

            let original_id = residue_numbers
                .as_ref()
                .and_then(|numbers| numbers.get(r))
                .map_or(r as isize + 1, |&n| n as isize);
            let chain_id = chain_ids
                .as_ref()
                .and_then(|ids| ids.get(r))
                .and_then(|id| id.chars().next())
                .unwrap_or(' ');
            builder.start_residue(&labels[r], original_id, chain_id);

            for a in first as usize..last as usize {
                let element = atomic_numbers
                    .as_ref()
                    .and_then(|numbers| numbers.get(a))
                    .and_then(|&n| u32::try_from(n).ok())
                    .and_then(elements::symbol_for_atomic_number);
                let mass = masses.as_ref().map(|m| m[a]);
                let charge = charges.as_ref().map_or(0.0, |c| c[a] / AMBER_CHARGE_SCALE);
                builder.add_atom(&names[a], element, mass, charge, Some(a + 1));
            }
        }

        if builder.n_atoms() != n_atoms {
            return Err(TopologyError::Inconsistency(format!(
                "residue pointers cover {} atoms, POINTERS declares {}",
                builder.n_atoms(),
                n_atoms
            )));
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn fixed<T: std::fmt::Display>(values: &[T], width: usize, per_line: usize) -> String {
        values
            .chunks(per_line)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|v| format!("{:>width$}", v, width = width))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn names(values: &[&str]) -> String {
        values
            .chunks(20)
            .map(|chunk| chunk.iter().map(|v| format!("{:<4}", v)).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn sample_parm7(with_numbers: bool) -> String {
        let mut pointers = vec![0i64; 31];
        pointers[POINTER_NATOM] = 7;
        pointers[POINTER_NRES] = 3;
        let charges: Vec<String> = [-0.4157, 0.0337, 0.5973, 1.0, -0.834, 0.417, 0.417]
            .iter()
            .map(|q| format!("{:.8E}", q * AMBER_CHARGE_SCALE))
            .collect();
        let masses: Vec<String> = [14.01, 12.01, 12.01, 22.99, 16.0, 1.008, 1.008]
            .iter()
            .map(|m| format!("{:.8E}", m))
            .collect();

        let mut text = String::from("%VERSION  VERSION_STAMP = V0001.000\n");
        text += "%FLAG TITLE\n%FORMAT(20a4)\ntest\n";
        text += &format!("%FLAG POINTERS\n%FORMAT(10I8)\n{}\n", fixed(&pointers, 8, 10));
        text += &format!(
            "%FLAG ATOM_NAME\n%FORMAT(20a4)\n{}\n",
            names(&["N", "CA", "C", "Na+", "O", "H1", "H2"])
        );
        text += &format!("%FLAG CHARGE\n%FORMAT(5E16.8)\n{}\n", fixed(&charges, 16, 5));
        text += &format!(
            "%FLAG ATOMIC_NUMBER\n%FORMAT(10I8)\n{}\n",
            fixed(&[7, 6, 6, 11, 8, 1, 1], 8, 10)
        );
        text += &format!("%FLAG MASS\n%FORMAT(5E16.8)\n{}\n", fixed(&masses, 16, 5));
        text += &format!(
            "%FLAG RESIDUE_LABEL\n%FORMAT(20a4)\n{}\n",
            names(&["GLY", "Na+", "WAT"])
        );
        text += &format!(
            "%FLAG RESIDUE_POINTER\n%FORMAT(10I8)\n{}\n",
            fixed(&[1, 4, 5], 8, 10)
        );
        if with_numbers {
            text += &format!(
                "%FLAG RESIDUE_NUMBER\n%FORMAT(20I4)\n{}\n",
                fixed(&[42, 43, 44], 4, 20)
            );
        }
        text
    }

    #[test]
    fn format_specifiers_are_parsed() {
        assert_eq!(
            FortranFormat::parse("(10I8)"),
            Some(FortranFormat {
                kind: FieldKind::Int,
                width: 8
            })
        );
        assert_eq!(
            FortranFormat::parse("(5E16.8)"),
            Some(FortranFormat {
                kind: FieldKind::Float,
                width: 16
            })
        );
        assert_eq!(
            FortranFormat::parse(" (20a4)"),
            Some(FortranFormat {
                kind: FieldKind::Text,
                width: 4
            })
        );
        assert_eq!(FortranFormat::parse("(bogus)"), None);
    }

    #[test]
    fn reads_atoms_and_residues() {
        let topology = Parm7File::read_from(&mut Cursor::new(sample_parm7(false))).unwrap();
        assert_eq!(topology.n_atoms(), 7);
        assert_eq!(topology.n_residues(), 3);

        let names: Vec<&str> = topology.residues().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["GLY", "Na+", "WAT"]);
        assert_eq!(topology.residues()[2].atom_indices(), 4..7);
        let ids: Vec<isize> = topology.residues().iter().map(|r| r.original_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn masses_charges_and_elements_are_taken_from_sections() {
        let topology = Parm7File::read_from(&mut Cursor::new(sample_parm7(false))).unwrap();
        let sodium = topology.atom(3).unwrap();
        assert_eq!(sodium.element, "NA");
        assert!((sodium.mass - 22.99).abs() < 1e-6);
        assert!((sodium.charge - 1.0).abs() < 1e-6);
        let ca = topology.atom(1).unwrap();
        assert_eq!(ca.name, "CA");
        assert_eq!(ca.element, "C");
        assert_eq!(ca.serial, 2);
    }

    #[test]
    fn residue_numbers_override_sequential_ids() {
        let topology = Parm7File::read_from(&mut Cursor::new(sample_parm7(true))).unwrap();
        let ids: Vec<isize> = topology.residues().iter().map(|r| r.original_id).collect();
        assert_eq!(ids, vec![42, 43, 44]);
    }

    #[test]
    fn missing_required_section_is_reported() {
        let text = sample_parm7(false).replace("%FLAG RESIDUE_POINTER", "%FLAG SOMETHING_ELSE");
        let err = Parm7File::read_from(&mut Cursor::new(text)).unwrap_err();
        assert!(matches!(err, TopologyError::MissingSection(name) if name == "RESIDUE_POINTER"));
    }

    #[test]
    fn malformed_integer_is_a_parse_error() {
        let text = sample_parm7(false).replace("       4       5", "       4     xyz");
        let err = Parm7File::read_from(&mut Cursor::new(text)).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::Parse {
                kind: Parm7ParseErrorKind::InvalidInt { .. },
                ..
            }
        ));
    }

    #[test]
    fn truncated_atom_names_are_inconsistent() {
        let text = sample_parm7(false).replace("O   H1  H2  ", "O   ");
        let err = Parm7File::read_from(&mut Cursor::new(text)).unwrap_err();
        assert!(matches!(err, TopologyError::Inconsistency(_)));
    }
}
