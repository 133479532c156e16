use thiserror::Error;

use super::model::{Column, Table, TableError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}

// ---------------------------------------------------------------------------
// ColumnSelection
// ---------------------------------------------------------------------------

/// An ordered set of column names, every one of which exists in the table it
/// was built against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    names: Vec<String>,
}

impl ColumnSelection {
    /// Validate `names` against `table`. Repeats collapse to their first
    /// position.
    pub fn new<I, S>(table: &Table, names: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if table.column(&name).is_none() {
                return Err(SelectionError::UnknownColumn(name));
            }
            if !out.contains(&name) {
                out.push(name);
            }
        }
        Ok(Self { names: out })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Project `table` onto the selected columns, in selection order.
pub fn select(table: &Table, selection: &ColumnSelection) -> Table {
    let columns: Vec<Column> = selection
        .names()
        .iter()
        .filter_map(|name| table.column(name).cloned())
        .collect();
    Table::from_parts(columns, table.labels().to_vec())
}

// ---------------------------------------------------------------------------
// NumericView
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    /// `None` where the source cell is missing.
    pub values: Vec<Option<f64>>,
}

/// The numeric-only projection of a table that charts are drawn from. Every
/// column has one value per row label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericView {
    columns: Vec<NumericColumn>,
    labels: Vec<usize>,
}

impl NumericView {
    pub fn new(columns: Vec<NumericColumn>, labels: Vec<usize>) -> Result<Self, TableError> {
        if let Some(col) = columns.iter().find(|c| c.values.len() != labels.len()) {
            return Err(TableError::LengthMismatch {
                column: col.name.clone(),
                expected: labels.len(),
                found: col.values.len(),
            });
        }
        Ok(Self { columns, labels })
    }

    pub fn columns(&self) -> &[NumericColumn] {
        &self.columns
    }

    /// Row labels of the table the view was taken from.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when there is no numeric column.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Keep the columns whose every cell is numeric or missing. Other columns are
/// dropped without complaint.
pub fn numeric_view(table: &Table) -> NumericView {
    let columns = table
        .columns()
        .iter()
        .filter(|col| col.values.iter().all(|v| v.is_numeric() || v.is_missing()))
        .map(|col| NumericColumn {
            name: col.name.clone(),
            values: col.values.iter().map(|v| v.as_f64()).collect(),
        })
        .collect();
    NumericView {
        columns,
        labels: table.labels().to_vec(),
    }
}
