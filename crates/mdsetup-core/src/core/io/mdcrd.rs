use crate::core::io::traits::FrameSource;
use crate::core::models::trajectory::Frame;
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

const FIELD_WIDTH: usize = 8;
const FIELDS_PER_LINE: usize = 10;

#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Trajectory ends in the middle of frame {frame}")]
    Truncated { frame: usize },
    #[error("Trajectory file is empty (no title line)")]
    MissingTitle,
    #[error("Cannot read coordinates for a topology without atoms")]
    NoAtoms,
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    (0..line.len())
        .step_by(FIELD_WIDTH)
        .map(move |start| line.get(start..(start + FIELD_WIDTH).min(line.len())).unwrap_or(""))
        .map(str::trim)
        .filter(|field| !field.is_empty())
}

/// Streams frames from an AMBER ASCII trajectory (`mdcrd`, `crd`, `trj`).
///
/// Coordinates are written as `10F8.3`, `ceil(3N/10)` lines per frame, optionally followed by a
/// box line with three lengths. Whether box lines are present is decided once, after the first
/// frame: a following line with exactly three fields marks a periodic trajectory. Single-atom
/// systems are always read without box information because the two layouts cannot be told apart.
pub struct MdcrdReader<R: BufRead> {
    reader: R,
    n_atoms: usize,
    title: String,
    line_num: usize,
    frames_read: usize,
    has_box: Option<bool>,
    pending: Option<String>,
}

impl<R: BufRead> MdcrdReader<R> {
    pub fn new(mut reader: R, n_atoms: usize) -> Result<Self, TrajectoryError> {
        if n_atoms == 0 {
            return Err(TrajectoryError::NoAtoms);
        }
        let mut title = String::new();
        if reader.read_line(&mut title)? == 0 {
            return Err(TrajectoryError::MissingTitle);
        }
        Ok(Self {
            reader,
            n_atoms,
            title: title.trim_end().to_string(),
            line_num: 1,
            frames_read: 0,
            has_box: None,
            pending: None,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn has_box(&self) -> Option<bool> {
        self.has_box
    }

    fn read_line(&mut self) -> Result<Option<String>, TrajectoryError> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_num += 1;
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn parse_values(&self, line: &str, out: &mut Vec<f64>) -> Result<(), TrajectoryError> {
        for field in split_fields(line) {
            let value = field.parse::<f64>().map_err(|_| TrajectoryError::Parse {
                line: self.line_num,
                message: format!("invalid coordinate '{}'", field),
            })?;
            out.push(value);
        }
        Ok(())
    }

    fn read_box(&mut self) -> Result<Option<Vector3<f64>>, TrajectoryError> {
        if self.has_box.is_none() {
            let next = self.read_line()?;
            let is_box = self.n_atoms > 1
                && next
                    .as_deref()
                    .is_some_and(|line| split_fields(line).count() == 3);
            self.has_box = Some(is_box);
            self.pending = next;
        }
        if self.has_box != Some(true) {
            return Ok(None);
        }

        let line = self.read_line()?.ok_or(TrajectoryError::Truncated {
            frame: self.frames_read + 1,
        })?;
        let mut lengths = Vec::with_capacity(3);
        self.parse_values(&line, &mut lengths)?;
        if lengths.len() != 3 {
            return Err(TrajectoryError::Parse {
                line: self.line_num,
                message: format!("expected 3 box lengths, found {}", lengths.len()),
            });
        }
        Ok(Some(Vector3::new(lengths[0], lengths[1], lengths[2])))
    }
}

impl MdcrdReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, n_atoms: usize) -> Result<Self, TrajectoryError> {
        Self::new(BufReader::new(File::open(path)?), n_atoms)
    }
}

impl<R: BufRead> FrameSource for MdcrdReader<R> {
    type Error = TrajectoryError;

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
        let n_values = 3 * self.n_atoms;
        let mut values = Vec::with_capacity(n_values);

        while values.len() < n_values {
            let Some(line) = self.read_line()? else {
                if values.is_empty() {
                    return Ok(None);
                }
                return Err(TrajectoryError::Truncated {
                    frame: self.frames_read + 1,
                });
            };
            if values.is_empty() && line.trim().is_empty() {
                continue;
            }
            self.parse_values(&line, &mut values)?;
        }
        if values.len() != n_values {
            return Err(TrajectoryError::Parse {
                line: self.line_num,
                message: format!(
                    "frame {} has {} coordinates, expected {}",
                    self.frames_read + 1,
                    values.len(),
                    n_values
                ),
            });
        }

        let unit_cell = self.read_box()?;
        self.frames_read += 1;
        let positions = values
            .chunks_exact(3)
            .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
            .collect();
        Ok(Some(Frame {
            positions,
            unit_cell,
        }))
    }
}

/// Writes frames in AMBER ASCII trajectory layout.
pub fn write_frames<'a>(
    writer: &mut impl Write,
    title: &str,
    frames: impl IntoIterator<Item = &'a Frame>,
) -> Result<(), TrajectoryError> {
    writeln!(writer, "{}", title)?;
    for frame in frames {
        let values = frame.positions.iter().flat_map(|p| [p.x, p.y, p.z]);
        for (i, value) in values.enumerate() {
            write!(writer, "{:8.3}", value)?;
            if (i + 1) % FIELDS_PER_LINE == 0 {
                writeln!(writer)?;
            }
        }
        if (3 * frame.n_atoms()) % FIELDS_PER_LINE != 0 {
            writeln!(writer)?;
        }
        if let Some(cell) = frame.unit_cell {
            writeln!(writer, "{:8.3}{:8.3}{:8.3}", cell.x, cell.y, cell.z)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn frame(n_atoms: usize, offset: f64, with_box: bool) -> Frame {
        Frame {
            positions: (0..n_atoms)
                .map(|i| Point3::new(i as f64 + offset, -(i as f64), 0.5 * i as f64))
                .collect(),
            unit_cell: with_box.then(|| Vector3::new(30.0, 31.0, 32.0)),
        }
    }

    fn encode(frames: &[Frame]) -> String {
        let mut out = Vec::new();
        write_frames(&mut out, "test trajectory", frames).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn read_all(text: &str, n_atoms: usize) -> Vec<Frame> {
        let mut reader = MdcrdReader::new(Cursor::new(text.to_string()), n_atoms).unwrap();
        let mut frames = Vec::new();
        while let Some(frame) = reader.next_frame().unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn lines_hold_ten_fields_of_eight_characters() {
        let text = encode(&[frame(4, 0.0, false)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "test trajectory");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].len(), 80);
        assert_eq!(lines[2].len(), 16);
    }

    #[test]
    fn frames_without_box_are_read_back() {
        let frames = vec![frame(5, 0.0, false), frame(5, 1.0, false), frame(5, 2.0, false)];
        let read = read_all(&encode(&frames), 5);
        assert_eq!(read.len(), 3);
        assert!(read.iter().all(|f| f.unit_cell.is_none()));
        assert!((read[2].positions[4].x - 6.0).abs() < 1e-9);
    }

    #[test]
    fn box_lines_are_detected() {
        let frames = vec![frame(7, 0.0, true), frame(7, 0.25, true)];
        let text = encode(&frames);
        let mut reader = MdcrdReader::new(Cursor::new(text), 7).unwrap();
        let first = reader.next_frame().unwrap().unwrap();
        assert_eq!(reader.has_box(), Some(true));
        assert_eq!(first.unit_cell, Some(Vector3::new(30.0, 31.0, 32.0)));
        let second = reader.next_frame().unwrap().unwrap();
        assert!((second.positions[0].x - 0.25).abs() < 1e-9);
        assert!(reader.next_frame().unwrap().is_none());
    }

    #[test]
    fn truncated_frame_is_an_error() {
        let text = encode(&[frame(5, 0.0, false), frame(5, 1.0, false)]);
        let cut: String = text.lines().take(4).collect::<Vec<_>>().join("\n");
        let mut reader = MdcrdReader::new(Cursor::new(cut), 5).unwrap();
        assert!(reader.next_frame().unwrap().is_some());
        assert!(matches!(
            reader.next_frame(),
            Err(TrajectoryError::Truncated { frame: 2 })
        ));
    }

    #[test]
    fn garbage_coordinates_are_parse_errors() {
        let text = "title\n   1.000   2.000     abc\n";
        let mut reader = MdcrdReader::new(Cursor::new(text), 1).unwrap();
        assert!(matches!(
            reader.next_frame(),
            Err(TrajectoryError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn empty_input_and_empty_topology_are_rejected() {
        assert!(matches!(
            MdcrdReader::new(Cursor::new(""), 3),
            Err(TrajectoryError::MissingTitle)
        ));
        assert!(matches!(
            MdcrdReader::new(Cursor::new("title\n"), 0),
            Err(TrajectoryError::NoAtoms)
        ));
    }
}
