//! Exogenous regressor matrix aligned to a time series.

use crate::error::{ForecastError, Result};

/// A column-major matrix of exogenous regressors.
///
/// Column order is significant: downstream consumers interpret fitted
/// coefficients and build forecast-time extensions by position, so the
/// matrix preserves insertion order rather than sorting by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExogenousMatrix {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    rows: usize,
}

impl ExogenousMatrix {
    /// Create an empty matrix (zero columns) for a series of `rows`
    /// observations. Valid input for every consumer: models treat it the
    /// same as "no regressors".
    pub fn empty(rows: usize) -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            rows,
        }
    }

    /// Append a named column. Must match the row count.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.rows {
            return Err(ForecastError::DimensionMismatch {
                expected: self.rows,
                got: values.len(),
            });
        }
        self.names.push(name.into());
        self.columns.push(values);
        Ok(())
    }

    /// Number of observations (rows).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of regressors (columns).
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether the matrix has no regressors.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column values by position.
    pub fn column(&self, index: usize) -> Result<&[f64]> {
        self.columns
            .get(index)
            .map(|c| c.as_slice())
            .ok_or(ForecastError::IndexOutOfBounds {
                index,
                size: self.columns.len(),
            })
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// One observation across all columns.
    pub fn row(&self, index: usize) -> Result<Vec<f64>> {
        if index >= self.rows {
            return Err(ForecastError::IndexOutOfBounds {
                index,
                size: self.rows,
            });
        }
        Ok(self.columns.iter().map(|c| c[index]).collect())
    }

    /// Copy out the half-open row window `[start, end)`, keeping all columns.
    pub fn slice_rows(&self, start: usize, end: usize) -> Result<ExogenousMatrix> {
        if start > end || end > self.rows {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.rows,
            });
        }
        Ok(ExogenousMatrix {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c[start..end].to_vec()).collect(),
            rows: end - start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matrix_has_rows_but_no_columns() {
        let m = ExogenousMatrix::empty(10);
        assert_eq!(m.rows(), 10);
        assert_eq!(m.num_columns(), 0);
        assert!(m.is_empty());
        assert_eq!(m.row(3).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn push_column_preserves_order() {
        let mut m = ExogenousMatrix::empty(3);
        m.push_column("break_1", vec![0.0, 1.0, 1.0]).unwrap();
        m.push_column("break_2", vec![0.0, 0.0, 1.0]).unwrap();

        assert_eq!(m.names(), &["break_1".to_string(), "break_2".to_string()]);
        assert_eq!(m.column(0).unwrap(), &[0.0, 1.0, 1.0]);
        assert_eq!(m.row(2).unwrap(), vec![1.0, 1.0]);
    }

    #[test]
    fn push_column_rejects_wrong_length() {
        let mut m = ExogenousMatrix::empty(3);
        let result = m.push_column("break_1", vec![0.0, 1.0]);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn slice_rows_keeps_columns_aligned() {
        let mut m = ExogenousMatrix::empty(4);
        m.push_column("a", vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        m.push_column("b", vec![5.0, 6.0, 7.0, 8.0]).unwrap();

        let s = m.slice_rows(1, 3).unwrap();
        assert_eq!(s.rows(), 2);
        assert_eq!(s.column(0).unwrap(), &[2.0, 3.0]);
        assert_eq!(s.column(1).unwrap(), &[6.0, 7.0]);
        assert!(m.slice_rows(2, 5).is_err());
    }
}
