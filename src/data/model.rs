use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Cell – a single value in a column
// ---------------------------------------------------------------------------

/// Strings that parse as a missing value, in both CSV and spreadsheet input.
pub const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#NA", "#N/A N/A", "-1.#IND", "1.#IND", "-1.#QNAN", "1.#QNAN",
];

const TRUE_LITERALS: &[&str] = &["True", "true", "TRUE"];
const FALSE_LITERALS: &[&str] = &["False", "false", "FALSE"];

/// A dynamically-typed cell mirroring the dtypes a dataframe parser infers.
/// Floats are never NaN; an unparseable or NaN number is `Missing`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Missing,
}

// -- Manual Eq/Hash so rows can be put in a HashSet for deduplication --

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Integer(i) => i.hash(state),
            // 0.0 == -0.0, so both must hash alike
            Cell::Float(f) if *f == 0.0 => 0u64.hash(state),
            Cell::Float(f) => f.to_bits().hash(state),
            Cell::Bool(b) => b.hash(state),
            Cell::Text(s) => s.hash(state),
            Cell::Missing => {}
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => write!(f, "<NA>"),
            other => write!(f, "{}", other.to_field()),
        }
    }
}

impl Cell {
    /// Classify one raw text field.
    pub fn parse(raw: &str) -> Self {
        if is_missing_marker(raw) {
            return Cell::Missing;
        }
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return if f.is_nan() { Cell::Missing } else { Cell::Float(f) };
        }
        if TRUE_LITERALS.contains(&trimmed) {
            return Cell::Bool(true);
        }
        if FALSE_LITERALS.contains(&trimmed) {
            return Cell::Bool(false);
        }
        Cell::Text(raw.to_string())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_) | Cell::Float(_))
    }

    /// Interpret the cell as an `f64` for plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Text form used in CSV output. Floats always keep a decimal point or
    /// exponent so they re-parse as floats.
    pub fn to_field(&self) -> Cow<'_, str> {
        match self {
            Cell::Integer(i) => Cow::Owned(i.to_string()),
            Cell::Float(v) => Cow::Owned(format!("{v:?}")),
            Cell::Bool(true) => Cow::Borrowed("True"),
            Cell::Bool(false) => Cow::Borrowed("False"),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Missing => Cow::Borrowed(""),
        }
    }
}

pub fn is_missing_marker(raw: &str) -> bool {
    MISSING_MARKERS.contains(&raw)
}

// ---------------------------------------------------------------------------
// Column type inference
// ---------------------------------------------------------------------------

/// The single kind a column is unified to after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every cell is missing.
    Empty,
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    pub fn of(cells: &[Cell]) -> Self {
        let mut kind = ColumnKind::Empty;
        for cell in cells {
            kind = match (kind, cell) {
                (k, Cell::Missing) => k,
                (ColumnKind::Empty | ColumnKind::Integer, Cell::Integer(_)) => ColumnKind::Integer,
                (ColumnKind::Empty | ColumnKind::Integer | ColumnKind::Float, Cell::Float(_))
                | (ColumnKind::Float, Cell::Integer(_)) => ColumnKind::Float,
                (ColumnKind::Empty | ColumnKind::Bool, Cell::Bool(_)) => ColumnKind::Bool,
                _ => return ColumnKind::Text,
            };
        }
        kind
    }

    /// Convert every non-missing cell to this kind.
    pub fn coerce(self, cells: Vec<Cell>) -> Vec<Cell> {
        cells
            .into_iter()
            .map(|cell| match (self, cell) {
                (_, Cell::Missing) => Cell::Missing,
                (ColumnKind::Float, Cell::Integer(i)) => Cell::Float(i as f64),
                (ColumnKind::Text, Cell::Text(s)) => Cell::Text(s),
                (ColumnKind::Text, other) => Cell::Text(other.to_field().into_owned()),
                (_, other) => other,
            })
            .collect()
    }
}

/// Unify a freshly parsed column to a single kind.
pub fn unify_column(cells: Vec<Cell>) -> Vec<Cell> {
    ColumnKind::of(&cells).coerce(cells)
}

/// Make header names non-empty and unique: blanks become `Unnamed: {i}`,
/// repeats become `name.1`, `name.2`, ...
pub fn clean_headers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let named: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            if name.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            }
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(named.len());
    for name in named {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while taken.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

// ---------------------------------------------------------------------------
// Column / Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        ColumnKind::of(&self.values)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Column-major table. Column names are unique and every column has the same
/// number of rows. Each row carries a label: its position in the uploaded
/// table, kept through cleaning so charts plot rows where they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    labels: Vec<usize>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        let mut names = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !names.insert(col.name.as_str()) {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
            if col.values.len() != n_rows {
                return Err(TableError::LengthMismatch {
                    column: col.name.clone(),
                    expected: n_rows,
                    found: col.values.len(),
                });
            }
        }
        Ok(Self {
            columns,
            labels: (0..n_rows).collect(),
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Row labels, one per row.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.columns.iter().map(move |c| &c.values[index])
    }

    /// Keep the rows whose entry in `keep` is true. `keep` must have one entry
    /// per row.
    pub fn filter_rows(&self, keep: &[bool]) -> Table {
        debug_assert_eq!(keep.len(), self.len());
        let columns = self
            .columns
            .iter()
            .map(|col| Column {
                name: col.name.clone(),
                values: col
                    .values
                    .iter()
                    .zip(keep)
                    .filter(|(_, k)| **k)
                    .map(|(v, _)| v.clone())
                    .collect(),
            })
            .collect();
        let labels = self
            .labels
            .iter()
            .zip(keep)
            .filter(|(_, k)| **k)
            .map(|(label, _)| *label)
            .collect();
        Table { columns, labels }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let n = n.min(self.len());
        let columns = self
            .columns
            .iter()
            .map(|col| Column {
                name: col.name.clone(),
                values: col.values[..n].to_vec(),
            })
            .collect();
        Table {
            columns,
            labels: self.labels[..n].to_vec(),
        }
    }

    /// Build from columns already known to satisfy the table invariants.
    pub(crate) fn from_parts(columns: Vec<Column>, labels: Vec<usize>) -> Table {
        Table { columns, labels }
    }
}
