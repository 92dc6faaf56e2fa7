use crate::core::models::table::{Table, TableError};
use nalgebra::{DMatrix, DVector};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("I/O error for '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Invalid value in '{path}' at row {row}: '{value}'")]
    InvalidValue {
        path: PathBuf,
        row: usize,
        value: String,
    },
    #[error("Invalid table in '{path}': {source}")]
    Table { path: PathBuf, source: TableError },
}

/// One named result that can be written to `<name>.csv`.
#[derive(Debug, Clone, Copy)]
pub enum DataField<'a> {
    Table(&'a Table),
    Matrix(&'a DMatrix<f64>),
    Vector(&'a DVector<f64>),
}

/// A value made of named tabular or array fields.
pub trait NamedFields {
    fn fields(&self) -> Vec<(&str, DataField<'_>)>;
}

fn format_value(value: f64) -> String {
    format!("{:.4}", value)
}

/// Writes every field of `data` to `<name>.csv` inside `dir`.
///
/// The directory must already exist. Returns the written paths in field order.
pub fn save_data(dir: &Path, data: &impl NamedFields) -> Result<Vec<PathBuf>, ResultsError> {
    let mut written = Vec::new();
    for (name, field) in data.fields() {
        let path = dir.join(format!("{}.csv", name));
        match field {
            DataField::Table(table) => write_table(&path, table)?,
            DataField::Matrix(matrix) => write_matrix(&path, matrix)?,
            DataField::Vector(vector) => write_vector(&path, vector)?,
        }
        info!(path = %path.display(), "Saved {}", name);
        written.push(path);
    }
    Ok(written)
}

/// Writes a table as CSV: a header row, then one row per index label.
pub fn write_table(path: &Path, table: &Table) -> Result<(), ResultsError> {
    let csv_err = |source| ResultsError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;

    let header = std::iter::once(table.index_name.as_str())
        .chain(table.columns.iter().map(String::as_str));
    writer.write_record(header).map_err(csv_err)?;

    for (row, label) in table.index.iter().enumerate() {
        let cells = table.values.row(row);
        let record = std::iter::once(label.to_string())
            .chain(cells.iter().map(|&v| format_value(v)));
        writer.write_record(record).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ResultsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_lines(path: &Path, lines: impl Iterator<Item = String>) -> Result<(), ResultsError> {
    let io_err = |source| ResultsError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}

/// Writes a matrix as comma-separated rows with four decimals.
pub fn write_matrix(path: &Path, matrix: &DMatrix<f64>) -> Result<(), ResultsError> {
    write_lines(
        path,
        matrix.row_iter().map(|row| {
            row.iter()
                .map(|&v| format_value(v))
                .collect::<Vec<_>>()
                .join(",")
        }),
    )
}

/// Writes a vector with one four-decimal value per line.
pub fn write_vector(path: &Path, vector: &DVector<f64>) -> Result<(), ResultsError> {
    write_lines(path, vector.iter().map(|&v| format_value(v)))
}

/// Reads a table previously written by [`write_table`].
pub fn read_table(path: &Path) -> Result<Table, ResultsError> {
    let csv_err = |source| ResultsError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    let index_name = headers.get(0).unwrap_or_default().to_string();
    let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut index = Vec::new();
    let mut cells = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let invalid = |value: &str| ResultsError::InvalidValue {
            path: path.to_path_buf(),
            row: row + 1,
            value: value.to_string(),
        };
        let label = record.get(0).unwrap_or_default();
        index.push(label.trim().parse::<i64>().map_err(|_| invalid(label))?);
        for value in record.iter().skip(1) {
            cells.push(value.trim().parse::<f64>().map_err(|_| invalid(value))?);
        }
    }

    let values = DMatrix::from_row_slice(index.len(), columns.len(), &cells);
    Table::new(index_name, columns, index, values).map_err(|source| ResultsError::Table {
        path: path.to_path_buf(),
        source,
    })
}
