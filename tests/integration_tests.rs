use complaintchart::aggregate::{self, Filter, Selection};
use complaintchart::data::{self, LoadError};
use complaintchart::graph::render_scene;
use complaintchart::interaction::Event;
use complaintchart::session::{load_chart, ChartKind, Controls};
use complaintchart::sort::SortOrder;
use complaintchart::{ChartOptions, OutputFormat};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

const BY_REASON: &str = "test/boston_311_2025_by_reason.csv";
const DETAILED: &str = "test/boston_311_detailed.csv";
const MALFORMED: &str = "test/malformed.csv";

/// Helper function to run the binary with arguments
fn run_complaintchart(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_complaintchart"))
        .args(args)
        .output()
        .expect("Failed to spawn complaintchart")
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("complaintchart-{}-{}", std::process::id(), name))
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

fn dashboard_stats(controls: Controls) -> (String, String, String, String) {
    match controls {
        Controls::Dashboard { stats, .. } => (stats.total, stats.average, stats.peak, stats.low),
        other => panic!("Expected dashboard controls, got {:?}", other),
    }
}

#[test]
fn test_fixture_summary_preserves_total() {
    let records = data::load_complaints(DETAILED).unwrap();
    assert_eq!(records.len(), 14);

    let summary = aggregate::monthly_summary(&records, &Filter::default());
    assert_eq!(summary.len(), 12);
    assert_eq!(summary.iter().map(|e| e.value).sum::<u64>(), 1216);

    let options = aggregate::filter_options(&records);
    assert_eq!(options.neighborhoods, vec!["Back Bay", "Dorchester", "Roxbury", "South End"]);
    assert_eq!(options.reasons.len(), 5);
}

#[test]
fn test_dashboard_session_end_to_end() {
    let mut chart = load_chart(ChartKind::Dashboard, DETAILED, &ChartOptions::default()).unwrap();
    assert_eq!(
        dashboard_stats(chart.controls(chart.settled_at())),
        ("1,216".to_string(), "101".to_string(), "Jul".to_string(), "Sep".to_string())
    );

    chart.handle(&Event::SelectReason(Selection::parse("Street Cleaning")), 1000.0);
    chart.handle(&Event::SelectNeighborhood(Selection::parse("Back Bay")), 1000.0);
    let (total, _, peak, _) = dashboard_stats(chart.controls(chart.settled_at()));
    assert_eq!(total, "215");
    assert_eq!(peak, "Jan");

    chart.handle(&Event::SortBy(SortOrder::Value), 3000.0);
    chart.handle(&Event::Hover { category: "Feb".into(), pointer: None }, 3000.0);
    let frame = chart.frame(chart.settled_at());
    assert_eq!(frame.with_prefix("bar:").count(), 12);
    assert!(frame.get("tooltip:box").is_some());

    let svg = String::from_utf8(render_scene(&frame, OutputFormat::Svg).unwrap()).unwrap();
    assert!(svg.contains("Area: Back Bay"));
    assert!(svg.contains("Count: 95"));
}

#[test]
fn test_top_n_session_end_to_end() {
    let options = ChartOptions { top_n: 5, ..ChartOptions::default() };
    let mut chart = load_chart(ChartKind::TopN, BY_REASON, &options).unwrap();
    assert_eq!(chart.frame(chart.settled_at()).with_prefix("bar:").count(), 5);

    chart.handle(&Event::ToggleView, 1000.0);
    match chart.controls(chart.settled_at()) {
        Controls::TopN { toggle_label, bars, .. } => {
            assert_eq!(toggle_label, "Show Top 5 Only");
            assert_eq!(bars, 15);
        }
        other => panic!("Expected top-n controls, got {:?}", other),
    }
}

#[test]
fn test_malformed_numeric_cell_fails_load() {
    match data::load_complaints(MALFORMED) {
        Err(LoadError::InvalidNumber { column, value, .. }) => {
            assert_eq!(column, "count");
            assert_eq!(value, "lots");
        }
        other => panic!("Expected InvalidNumber, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_json_source() {
    let path = temp_path("reasons.json");
    fs::write(&path, r#"[{"reason": "Noise", "Count": 7}, {"reason": "Trash", "Count": 12}]"#).unwrap();
    let records = data::load_reason_counts(path.to_str().unwrap()).unwrap();
    let _ = fs::remove_file(&path);

    let ranked = aggregate::rank(&records);
    assert_eq!(ranked[0].category, "Trash");
}

#[test]
fn test_binary_top_n_svg_to_stdout() {
    let output = run_complaintchart(&["top-n", BY_REASON]);
    assert!(output.status.success(), "Failed: {}", String::from_utf8_lossy(&output.stderr));
    let svg = String::from_utf8_lossy(&output.stdout);
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Street Cleaning"));
    assert!(!svg.contains("Noise Disturbance"));
}

#[test]
fn test_binary_dashboard_script_and_controls() {
    let out = temp_path("dashboard.svg");
    let controls = temp_path("controls.json");
    let output = run_complaintchart(&[
        "dashboard",
        DETAILED,
        "--script",
        r#"reason("Sanitation") | wait(100) | sort(count) | wait(1500)"#,
        "--out",
        out.to_str().unwrap(),
        "--controls",
        controls.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "Failed: {}", String::from_utf8_lossy(&output.stderr));

    let svg = fs::read_to_string(&out).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&controls).unwrap()).unwrap();
    let _ = fs::remove_file(&out);
    let _ = fs::remove_file(&controls);

    assert!(svg.contains("Total: 290"));
    assert_eq!(json["chart"], "dashboard");
    assert_eq!(json["reason"]["selected"], "Sanitation");
    assert_eq!(json["sort_buttons"][1]["active"], true);
    assert_eq!(json["stats"]["peak"], "Jun");
}

#[test]
fn test_binary_error_scene_on_missing_file() {
    let output = run_complaintchart(&["dashboard", "test/does_not_exist.csv", "--format", "svg"]);
    assert!(!output.status.success());
    let svg = String::from_utf8_lossy(&output.stdout);
    assert!(svg.contains("Failed to load data file. Please ensure test/does_not_exist.csv exists."));
}

#[test]
fn test_binary_error_scene_for_empty_stdin() {
    let output = run_complaintchart(&["top-n", "-"]);
    assert!(!output.status.success());
    let svg = String::from_utf8_lossy(&output.stdout);
    assert!(svg.contains("Failed to load data from stdin."));
    assert!(!svg.contains("Please ensure - exists"));
}

#[test]
fn test_binary_malformed_data_exits_non_zero() {
    let output = run_complaintchart(&["dashboard", MALFORMED]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("data load failed"));
}

#[test]
fn test_binary_rejects_bad_script() {
    let output = run_complaintchart(&["top-n", BY_REASON, "--script", "toggle() | explode()"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse interaction script"));
}

#[test]
fn test_options_file_overrides() {
    let options = temp_path("options.json");
    fs::write(&options, r##"{"top_n": 3, "colors": {"low": "#000000"}}"##).unwrap();
    let controls = temp_path("top-n-controls.json");
    let output = run_complaintchart(&[
        "top-n",
        BY_REASON,
        "--options",
        options.to_str().unwrap(),
        "--controls",
        controls.to_str().unwrap(),
    ]);
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&controls).unwrap()).unwrap();
    let _ = fs::remove_file(&options);
    let _ = fs::remove_file(&controls);

    assert!(output.status.success());
    assert_eq!(json["bars"], 3);
    assert_eq!(json["toggle_label"], "Show All Reasons");
}

#[test]
fn test_png_library_output() {
    use complaintchart::ir::{DrawCommand, SceneGraph};
    use plotters::style::RGBColor;

    let mut scene = SceneGraph::new(40, 30);
    scene.push(
        "bar:a",
        DrawCommand::Rect { x: 5.0, y: 5.0, width: 20.0, height: 10.0, radius: 4.0, fill: RGBColor(108, 92, 231), opacity: 0.4 },
    );
    assert!(is_valid_png(&render_scene(&scene, OutputFormat::Png).unwrap()));
}
