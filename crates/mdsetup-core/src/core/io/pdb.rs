use crate::core::io::traits::{FrameSource, TopologyFile};
use crate::core::models::topology::{Topology, TopologyBuilder};
use crate::core::models::trajectory::Frame;
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn is_atom_record(line: &str) -> bool {
    line.starts_with("ATOM") || line.starts_with("HETATM")
}

/// Only the first alternate location of each atom is kept.
fn is_primary_altloc(line: &str) -> bool {
    matches!(line.get(16..17), None | Some(" ") | Some("A"))
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_position(line: &str, line_num: usize) -> Result<Point3<f64>, PdbError> {
    if line.len() < 54 {
        return Err(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::LineTooShort,
        });
    }
    Ok(Point3::new(
        parse_float(line, line_num, 30, 38)?,
        parse_float(line, line_num, 38, 46)?,
        parse_float(line, line_num, 46, 54)?,
    ))
}

fn parse_unit_cell(line: &str, line_num: usize) -> Result<Vector3<f64>, PdbError> {
    Ok(Vector3::new(
        parse_float(line, line_num, 6, 15)?,
        parse_float(line, line_num, 15, 24)?,
        parse_float(line, line_num, 24, 33)?,
    ))
}

/// Reader and writer for PDB files.
///
/// As a topology source only the first model is read. Residues are split whenever the chain
/// identifier, residue number, insertion code or residue name changes.
pub struct PdbFile;

impl TopologyFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Topology, Self::Error> {
        let mut builder = TopologyBuilder::new();
        let mut current_key: Option<(char, isize, char, String)> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            if line.starts_with("ENDMDL") || (line.starts_with("END") && builder.n_atoms() > 0) {
                break;
            }
            if !is_atom_record(&line) || !is_primary_altloc(&line) {
                continue;
            }
            if line.len() < 54 {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::LineTooShort,
                });
            }

            let serial_str = slice_and_trim(&line, 6, 11);
            let name = slice_and_trim(&line, 12, 16);
            let res_name = slice_and_trim(&line, 17, 21);
            let chain_id = line.get(21..22).and_then(|s| s.chars().next()).unwrap_or(' ');
            let res_seq_str = slice_and_trim(&line, 22, 26);
            let insertion = line.get(26..27).and_then(|s| s.chars().next()).unwrap_or(' ');
            let element = slice_and_trim(&line, 76, 78);

            let res_seq: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "23-26".into(),
                    value: res_seq_str.into(),
                },
            })?;
            let serial = serial_str.parse::<usize>().ok();

            let key = (chain_id, res_seq, insertion, res_name.to_string());
            if current_key.as_ref() != Some(&key) {
                builder.start_residue(res_name, res_seq, chain_id);
                current_key = Some(key);
            }
            let element = (!element.is_empty()).then_some(element);
            builder.add_atom(name, element, None, 0.0, serial);
        }

        if builder.n_atoms() == 0 {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        Ok(builder.build())
    }
}

/// Streams coordinate frames from a PDB file, one per `MODEL`/`ENDMDL` block.
///
/// Files without `MODEL` records yield a single frame.
pub struct PdbFrameReader<R: BufRead> {
    reader: R,
    line_num: usize,
    unit_cell: Option<Vector3<f64>>,
    finished: bool,
}

impl<R: BufRead> PdbFrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_num: 0,
            unit_cell: None,
            finished: false,
        }
    }
}

impl PdbFrameReader<io::BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PdbError> {
        Ok(Self::new(io::BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> FrameSource for PdbFrameReader<R> {
    type Error = PdbError;

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
        if self.finished {
            return Ok(None);
        }
        let mut positions = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                self.finished = true;
                break;
            }
            self.line_num += 1;
            let record = line.trim_end_matches(['\r', '\n']);

            if record.starts_with("CRYST1") {
                self.unit_cell = Some(parse_unit_cell(record, self.line_num)?);
            } else if record.starts_with("MODEL") {
                positions.clear();
            } else if is_atom_record(record) {
                if is_primary_altloc(record) {
                    positions.push(parse_position(record, self.line_num)?);
                }
            } else if record.starts_with("ENDMDL") {
                if !positions.is_empty() {
                    break;
                }
            } else if record.starts_with("END") {
                self.finished = true;
                break;
            }
        }

        if positions.is_empty() {
            return Ok(None);
        }
        Ok(Some(Frame {
            positions,
            unit_cell: self.unit_cell,
        }))
    }
}

fn format_atom_name(name: &str) -> String {
    if name.chars().count() >= 4 {
        name.chars().take(4).collect()
    } else {
        format!(" {:<3}", name)
    }
}

/// Writes one frame of `topology` as a PDB structure.
///
/// When `b_factors` is given it supplies the temperature-factor column for every atom;
/// otherwise the column is zero.
pub fn write_structure(
    writer: &mut impl Write,
    topology: &Topology,
    frame: &Frame,
    b_factors: Option<&[f64]>,
) -> Result<(), PdbError> {
    if frame.n_atoms() != topology.n_atoms() {
        return Err(PdbError::Inconsistency(format!(
            "frame has {} atoms but the topology has {}",
            frame.n_atoms(),
            topology.n_atoms()
        )));
    }
    if let Some(values) = b_factors {
        if values.len() != topology.n_atoms() {
            return Err(PdbError::Inconsistency(format!(
                "{} B-factors supplied for {} atoms",
                values.len(),
                topology.n_atoms()
            )));
        }
    }

    if let Some(cell) = frame.unit_cell {
        writeln!(
            writer,
            "CRYST1{:>9.3}{:>9.3}{:>9.3}{:>7.2}{:>7.2}{:>7.2} P 1           1",
            cell.x, cell.y, cell.z, 90.0, 90.0, 90.0
        )?;
    }

    let mut previous_chain: Option<char> = None;
    for (i, (atom, position)) in topology.atoms().iter().zip(&frame.positions).enumerate() {
        let residue = &topology.residues()[atom.residue_index];
        if previous_chain.is_some_and(|c| c != residue.chain_id) {
            writeln!(writer, "TER")?;
        }
        previous_chain = Some(residue.chain_id);

        let b_factor = b_factors.map_or(0.0, |values| values[i]);
        writeln!(
            writer,
            "ATOM  {:>5} {:>4} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
            (i + 1) % 100_000,
            format_atom_name(&atom.name),
            residue.name,
            residue.chain_id,
            residue.original_id.rem_euclid(10_000),
            position.x,
            position.y,
            position.z,
            1.0,
            b_factor,
            atom.element
        )?;
    }
    writeln!(writer, "TER")?;
    writeln!(writer, "END")?;
    Ok(())
}

pub fn write_structure_to_path<P: AsRef<Path>>(
    path: P,
    topology: &Topology,
    frame: &Frame,
    b_factors: Option<&[f64]>,
) -> Result<(), PdbError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_structure(&mut writer, topology, frame, b_factors)?;
    writer.flush()?;
    Ok(())
}
