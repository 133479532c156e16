use pretty_assertions::assert_eq;
use rusty_charts::chart::{chart, ChartHandle, ChartKind, ChartRequest, ChartWarning};
use rusty_charts::data::clean::{deduplicate, drop_missing, Cleaning};
use rusty_charts::data::loader::ingest;
use rusty_charts::data::model::{Cell, Column, Table};
use rusty_charts::data::view::{numeric_view, select, ColumnSelection};
use rusty_charts::export::{export, ExportFormat};
use rusty_charts::pipeline::Stage;
use rusty_charts::session::{Action, Response, Session};

fn id_name_table() -> Table {
    Table::new(vec![
        Column::new("id", vec![Cell::Integer(1), Cell::Integer(2)]),
        Column::new(
            "name",
            vec![Cell::Text("alice".into()), Cell::Text("bob".into())],
        ),
    ])
    .unwrap()
}

fn mixed_table() -> Table {
    Table::new(vec![
        Column::new("a", vec![Cell::Integer(1), Cell::Integer(1), Cell::Missing]),
        Column::new("label", vec![
            Cell::Text("x".into()),
            Cell::Text("x".into()),
            Cell::Text("y".into()),
        ]),
        Column::new("f", vec![Cell::Float(0.5), Cell::Float(0.5), Cell::Float(2.0)]),
    ])
    .unwrap()
}

#[test]
fn csv_round_trip_reproduces_table() {
    let table = id_name_table();
    let bytes = export(&table, ExportFormat::Csv).unwrap();
    assert_eq!(ingest(&bytes, "x.csv").unwrap(), table);
}

#[test]
fn csv_round_trip_keeps_floats_and_missing() {
    let table = mixed_table();
    let bytes = export(&table, ExportFormat::Csv).unwrap();
    assert_eq!(ingest(&bytes, "x.csv").unwrap(), table);
}

#[test]
fn excel_round_trip_reproduces_table() {
    let table = id_name_table();
    let bytes = export(&table, ExportFormat::Excel).unwrap();
    assert_eq!(ingest(&bytes, "converted_file.xlsx").unwrap(), table);
}

#[test]
fn selection_order_is_preserved() {
    let table = mixed_table();
    let selection = ColumnSelection::new(&table, ["f", "label", "a"]).unwrap();
    assert_eq!(select(&table, &selection).column_names(), vec!["f", "label", "a"]);
}

#[test]
fn numeric_view_matches_columns_without_text() {
    let view = numeric_view(&mixed_table());
    assert_eq!(view.column_names(), vec!["a", "f"]);
}

#[test]
fn cleaning_is_idempotent_on_sample() {
    let table = mixed_table();
    let once = drop_missing(&deduplicate(&table));
    assert_eq!(once.len(), 1);
    assert_eq!(drop_missing(&deduplicate(&once)), once);
}

#[test]
fn scatter_with_one_numeric_column_warns() {
    let table = mixed_table();
    let selection = ColumnSelection::new(&table, ["a", "label"]).unwrap();
    let view = numeric_view(&select(&table, &selection));
    let request = ChartRequest {
        kind: ChartKind::Scatter,
        source: &view,
    };
    assert_eq!(chart(&request), Err(ChartWarning::NeedTwoNumericColumns));
}

#[test]
fn line_and_bar_without_numeric_columns_warn() {
    let table = mixed_table();
    let selection = ColumnSelection::new(&table, ["label"]).unwrap();
    let view = numeric_view(&select(&table, &selection));
    for kind in [ChartKind::Line, ChartKind::Bar] {
        let request = ChartRequest { kind, source: &view };
        assert_eq!(chart(&request), Err(ChartWarning::NoNumericColumns));
    }
}

#[test]
fn upload_dedupe_select_bar_end_to_end() {
    let mut session = Session::default();

    let response = session.handle(Action::Upload {
        file_name: "numbers.csv".into(),
        bytes: b"a,b\n1,2\n1,2\n3,4\n".to_vec(),
    });
    assert!(matches!(response, Response::Loaded { rows: 3, columns: 2 }));

    session.handle(Action::SetCleaning(Cleaning {
        deduplicate: true,
        drop_missing: false,
    }));
    assert_eq!(session.pipeline().table().unwrap().len(), 2);

    session.handle(Action::SetChartKind(ChartKind::Bar));
    let response = session.handle(Action::SelectColumns(vec!["a".into(), "b".into()]));
    let Response::Chart(ChartHandle::Bar { series, groups }) = response else {
        panic!("expected a bar chart");
    };
    assert_eq!(series.len(), 2);
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g.bars.len() == 2));
    assert_eq!(session.pipeline().stage(), Stage::Charted);

    let Response::Download(artifact) = session.handle(Action::Export) else {
        panic!("expected a download");
    };
    assert_eq!(artifact.file_name, "converted_file.csv");
    assert_eq!(artifact.bytes, b"a,b\n1,2\n3,4\n".to_vec());
    assert_eq!(session.pipeline().stage(), Stage::Exported);

    // Re-selecting drops the stale export and recomputes the chart.
    let response = session.handle(Action::SelectColumns(vec!["b".into()]));
    assert!(matches!(response, Response::Chart(ChartHandle::Bar { .. })));
    assert!(session.pipeline().artifact().is_none());
    assert_eq!(session.pipeline().stage(), Stage::Charted);
}
