use std::collections::HashSet;

use super::model::Table;

/// Which cleaning steps are switched on. Applied in a fixed order:
/// deduplicate first, then drop missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cleaning {
    pub deduplicate: bool,
    pub drop_missing: bool,
}

impl Cleaning {
    pub fn is_active(&self) -> bool {
        self.deduplicate || self.drop_missing
    }

    pub fn apply(&self, table: &Table) -> Table {
        let mut out = if self.deduplicate {
            deduplicate(table)
        } else {
            table.clone()
        };
        if self.drop_missing {
            out = drop_missing(&out);
        }
        out
    }
}

/// Remove rows identical to an earlier row. The first occurrence is kept and
/// missing cells compare equal to each other.
pub fn deduplicate(table: &Table) -> Table {
    let mut seen = HashSet::with_capacity(table.len());
    let keep: Vec<bool> = (0..table.len())
        .map(|i| seen.insert(table.row(i).collect::<Vec<_>>()))
        .collect();
    log::debug!(
        "deduplicate: {} of {} rows kept",
        keep.iter().filter(|k| **k).count(),
        table.len()
    );
    table.filter_rows(&keep)
}

/// Remove rows holding a missing value in any column.
pub fn drop_missing(table: &Table) -> Table {
    let keep: Vec<bool> = (0..table.len())
        .map(|i| !table.row(i).any(|cell| cell.is_missing()))
        .collect();
    table.filter_rows(&keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Cell, Column};
    use proptest::prelude::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new(
                "a",
                vec![Cell::Integer(1), Cell::Integer(1), Cell::Missing, Cell::Missing],
            ),
            Column::new(
                "b",
                vec![
                    Cell::Text("x".into()),
                    Cell::Text("x".into()),
                    Cell::Text("y".into()),
                    Cell::Text("y".into()),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn deduplicate_keeps_first_occurrence() {
        let out = deduplicate(&sample());
        assert_eq!(out.len(), 2);
        assert_eq!(out.column("a").unwrap().values, vec![Cell::Integer(1), Cell::Missing]);
        assert_eq!(out.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn drop_missing_removes_incomplete_rows() {
        let out = drop_missing(&sample());
        assert_eq!(out.len(), 2);
        assert!(out.columns().iter().all(|c| c.values.iter().all(|v| !v.is_missing())));
    }

    #[test]
    fn cleaning_applies_both_steps() {
        let cleaning = Cleaning {
            deduplicate: true,
            drop_missing: true,
        };
        let out = cleaning.apply(&sample());
        assert_eq!(out.len(), 1);
        assert!(!Cleaning::default().is_active());
    }

    fn cell_strategy() -> impl Strategy<Value = Cell> {
        prop_oneof![
            Just(Cell::Missing),
            (0i64..3).prop_map(Cell::Integer),
            prop::sample::select(vec!["x", "y"]).prop_map(|s| Cell::Text(s.to_string())),
        ]
    }

    fn table_strategy() -> impl Strategy<Value = Table> {
        (1usize..4, 0usize..10)
            .prop_flat_map(|(width, rows)| {
                prop::collection::vec(prop::collection::vec(cell_strategy(), rows), width)
            })
            .prop_map(|columns| {
                let columns = columns
                    .into_iter()
                    .enumerate()
                    .map(|(i, values)| Column::new(format!("c{i}"), values))
                    .collect();
                Table::new(columns).unwrap()
            })
    }

    proptest! {
        #[test]
        fn deduplicate_is_idempotent(table in table_strategy()) {
            let once = deduplicate(&table);
            prop_assert_eq!(deduplicate(&once), once);
        }

        #[test]
        fn drop_missing_is_idempotent(table in table_strategy()) {
            let once = drop_missing(&table);
            prop_assert_eq!(drop_missing(&once), once);
        }

        #[test]
        fn deduplicate_leaves_no_repeated_rows(table in table_strategy()) {
            let out = deduplicate(&table);
            let rows: HashSet<Vec<&Cell>> = (0..out.len()).map(|i| out.row(i).collect()).collect();
            prop_assert_eq!(rows.len(), out.len());
        }
    }
}
