//! Cell access over tabular row data.

/// Read access to textual cell values by `(row, column)`.
///
/// The classifier only ever sees data through this trait, never through a
/// concrete storage format.
pub trait RowSource {
    /// The value at `(row, column)`, or `None` when the cell does not exist.
    fn value(&self, row: usize, column: usize) -> Option<&str>;

    /// Number of rows available.
    fn num_rows(&self) -> usize;
}

impl RowSource for [Vec<String>] {
    fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.get(row)?.get(column).map(String::as_str)
    }

    fn num_rows(&self) -> usize {
        self.len()
    }
}

impl RowSource for Vec<Vec<String>> {
    fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.as_slice().value(row, column)
    }

    fn num_rows(&self) -> usize {
        self.len()
    }
}

impl<T: RowSource + ?Sized> RowSource for &T {
    fn value(&self, row: usize, column: usize) -> Option<&str> {
        (**self).value(row, column)
    }

    fn num_rows(&self) -> usize {
        (**self).num_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::RowSource;

    #[test]
    fn nested_vectors_expose_cells() {
        let rows = vec![
            vec!["a".to_string(), "1".to_string()],
            vec!["b".to_string(), "2".to_string()],
        ];
        assert_eq!(rows.num_rows(), 2);
        assert_eq!(rows.value(1, 0), Some("b"));
        assert_eq!(rows.value(0, 2), None);
        assert_eq!(rows.value(5, 0), None);
    }
}
