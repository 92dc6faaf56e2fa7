use nalgebra::DMatrix;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("table has {rows} rows but an index of length {index}")]
    IndexLength { rows: usize, index: usize },
    #[error("table has {cols} columns but {names} column names")]
    ColumnCount { cols: usize, names: usize },
}

/// A labelled two-dimensional table of numbers: one integer index column plus named value
/// columns, written to disk as CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub index_name: String,
    pub columns: Vec<String>,
    pub index: Vec<i64>,
    pub values: DMatrix<f64>,
}

impl Table {
    pub fn new(
        index_name: impl Into<String>,
        columns: Vec<String>,
        index: Vec<i64>,
        values: DMatrix<f64>,
    ) -> Result<Self, TableError> {
        if index.len() != values.nrows() {
            return Err(TableError::IndexLength {
                rows: values.nrows(),
                index: index.len(),
            });
        }
        if columns.len() != values.ncols() {
            return Err(TableError::ColumnCount {
                cols: values.ncols(),
                names: columns.len(),
            });
        }
        Ok(Self {
            index_name: index_name.into(),
            columns,
            index,
            values,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let position = self.columns.iter().position(|c| c == name)?;
        Some(self.values.column(position).iter().copied().collect())
    }

    pub fn last_column(&self) -> Option<Vec<f64>> {
        if self.n_cols() == 0 {
            return None;
        }
        Some(
            self.values
                .column(self.n_cols() - 1)
                .iter()
                .copied()
                .collect(),
        )
    }

    /// Builds a new table from the given row positions, keeping their index labels.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let values = self.values.select_rows(rows);
        Self {
            index_name: self.index_name.clone(),
            columns: self.columns.clone(),
            index: rows.iter().map(|&r| self.index[r]).collect(),
            values,
        }
    }

    pub fn with_index(
        mut self,
        index_name: impl Into<String>,
        index: Vec<i64>,
    ) -> Result<Self, TableError> {
        if index.len() != self.n_rows() {
            return Err(TableError::IndexLength {
                rows: self.n_rows(),
                index: index.len(),
            });
        }
        self.index_name = index_name.into();
        self.index = index;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            "#Atom_no.",
            vec!["a".into(), "b".into()],
            vec![1, 2, 3],
            DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        )
        .unwrap()
    }

    #[test]
    fn new_validates_shape() {
        let err = Table::new("i", vec!["a".into()], vec![1], DMatrix::zeros(2, 1)).unwrap_err();
        assert_eq!(err, TableError::IndexLength { rows: 2, index: 1 });
        let err = Table::new("i", vec![], vec![1, 2], DMatrix::zeros(2, 1)).unwrap_err();
        assert_eq!(err, TableError::ColumnCount { cols: 1, names: 0 });
    }

    #[test]
    fn columns_are_accessible_by_name_and_position() {
        let table = sample();
        assert_eq!(table.column("a"), Some(vec![1.0, 3.0, 5.0]));
        assert_eq!(table.last_column(), Some(vec![2.0, 4.0, 6.0]));
        assert_eq!(table.column("missing"), None);
    }

    #[test]
    fn select_rows_keeps_labels() {
        let table = sample().select_rows(&[0, 2]);
        assert_eq!(table.index, vec![1, 3]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("b"), Some(vec![2.0, 6.0]));
    }

    #[test]
    fn with_index_relabels_rows() {
        let table = sample().with_index("#Residue_no.", vec![7, 8, 9]).unwrap();
        assert_eq!(table.index_name, "#Residue_no.");
        assert_eq!(table.index, vec![7, 8, 9]);
        assert!(sample().with_index("x", vec![1]).is_err());
    }
}
