use crate::core::models::topology::Topology;
use crate::core::models::trajectory::Frame;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading a topology from a molecular file format.
///
/// Implementors handle format-specific parsing; opening files is shared through
/// [`read_from_path`](TopologyFile::read_from_path).
pub trait TopologyFile {
    /// The error type for I/O and parse failures.
    type Error: Error + From<io::Error>;

    /// Reads a topology from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Topology, Self::Error>;

    /// Reads a topology from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Topology, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// A streaming source of coordinate frames.
///
/// Readers yield frames in file order and never buffer more than one frame; the loader decides
/// which frames to keep.
pub trait FrameSource {
    type Error: Error;

    /// Reads the next frame, returning `Ok(None)` at the end of the file.
    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error>;

    /// Advances past the next frame without building it, returning `false` at the end of the file.
    fn skip_frame(&mut self) -> Result<bool, Self::Error> {
        Ok(self.next_frame()?.is_some())
    }
}
