//! End-to-end tests: stored rows through the loader, the engine and the renderer.

use p1dash_core::{ChartKind, Dashboard, Error, LoaderOptions, load, render_html};
use p1dash_types::RawReading;
use time::macros::datetime;

/// 2024-03-05 09:00 UTC, 10:00 in Amsterdam.
const BASE: f64 = 1_709_629_200.0;
const QUARTER: f64 = 900.0;

fn row(offset: f64, power: f64, import: f64, export: f64) -> RawReading {
    RawReading {
        timestamp: Some(BASE + offset),
        active_power_w: Some(power),
        import_kwh: Some(import),
        export_kwh: Some(export),
    }
}

fn utc() -> LoaderOptions {
    LoaderOptions::new("UTC", 10.0).unwrap()
}

#[test]
fn quarter_hour_scenario() {
    let rows = [
        row(0.0, 1000.0, 500.000, 20.0),
        row(QUARTER, 1000.0, 500.010, 20.0),
        row(2.0 * QUARTER, 1000.0, 500.022, 20.0),
        row(3.0 * QUARTER, 1000.0, 500.020, 20.0),
    ];
    let readings = load(&rows, &LoaderOptions::default()).unwrap();
    let dashboard = Dashboard::build(&readings, datetime!(2024-03-05 12:00 UTC)).unwrap();

    let day = &dashboard.periods.day["2024-03-05"];
    assert_eq!(day.chart_kind, ChartKind::Line);
    assert_eq!(day.labels, vec!["10:00", "10:15", "10:30", "10:45"]);
    let expected = [0.0, 40.0, 48.0, 0.0];
    for (got, want) in day.imports.iter().zip(expected) {
        assert!((got - want).abs() < 1e-6, "{got} != {want}");
    }
    assert_eq!(day.total_import, 0.022);

    // The week view skips the reset pair instead of clamping it
    let week = &dashboard.periods.week["2024-10"];
    assert_eq!(week.labels, vec!["di 5/3"]);
    assert_eq!(week.total_import, 0.022);

    assert_eq!(dashboard.latest.active_w, 100.0);
    assert_eq!(dashboard.latest.label, "2024-03-05 10:45");
}

#[test]
fn counter_reset_across_days() {
    let day = 86_400.0;
    let rows = [
        row(0.0, 0.0, 100.0, 0.0),
        row(day, 0.0, 90.0, 0.0),
        row(2.0 * day, 0.0, 95.0, 0.0),
    ];
    let readings = load(&rows, &utc()).unwrap();
    let dashboard = Dashboard::build(&readings, datetime!(2024-03-08 00:00 UTC)).unwrap();
    let periods = &dashboard.periods;

    assert_eq!(periods.week["2024-10"].imports, vec![5.0]);
    assert_eq!(periods.month["2024-03"].total_import, 5.0);
    assert_eq!(periods.year["2024"].total_import, 5.0);
    assert_eq!(periods.years["2024-2024"].total_import, 5.0);
    assert!(periods.year["2024"].imports.iter().all(|v| *v >= 0.0));
}

#[test]
fn duplicate_rows_do_not_change_output() {
    let rows = [row(0.0, 10.0, 1.0, 0.0), row(QUARTER, 10.0, 1.5, 0.0)];
    let doubled = [rows[0], rows[0], rows[1], rows[1]];
    let now = datetime!(2024-03-05 12:00 UTC);

    let once = Dashboard::build(&load(&rows, &utc()).unwrap(), now).unwrap();
    let twice = Dashboard::build(&load(&doubled, &utc()).unwrap(), now).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn empty_store_is_no_data() {
    assert!(matches!(load(&[], &utc()), Err(Error::NoData)));
}

#[test]
fn rendered_page_carries_every_view() {
    let rows = [row(0.0, 10.0, 1.0, 0.0), row(40.0 * 86_400.0, 10.0, 9.0, 1.0)];
    let readings = load(&rows, &utc()).unwrap();
    let dashboard = Dashboard::build(&readings, datetime!(2024-05-01 00:00 UTC)).unwrap();
    let html = render_html(&dashboard).unwrap();

    for key in ["\"day\"", "\"week\"", "\"month\"", "\"year\"", "\"years\"", "\"latest\""] {
        assert!(html.contains(key), "missing {key}");
    }
    assert!(html.contains("\"Jaren 2024 t/m 2024\""));
    assert_eq!(dashboard.periods.day.len(), 41);
}
