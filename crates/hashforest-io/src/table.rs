use hashforest_classify::RowSource;

use crate::IoError;

/// A header plus rows of string cells, every row as wide as the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.headers.len()
    }

    /// Index of the column called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownColumn`] if the header has no such column.
    pub fn column_index(&self, name: &str) -> Result<usize, IoError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IoError::UnknownColumn {
                name: name.to_owned(),
            })
    }

    /// A new table holding only the columns called `names`, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownColumn`] for the first name not in the header.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, IoError> {
        let indices = names
            .iter()
            .map(|n| self.column_index(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let headers = indices.iter().map(|&i| self.headers[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Ok(Table::new(headers, rows))
    }

    /// Every cell of column `column`, top to bottom.
    pub fn column(&self, column: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |r| r.get(column).map(String::as_str))
    }
}

impl RowSource for Table {
    fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.as_slice().value(row, column)
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }
}
