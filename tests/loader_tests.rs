use hitmap::loader::{
    load_any_results, load_collection, read_collection, read_line_csv, read_results,
};
use hitmap::geometry::GridGeometry;
use hitmap::results::{Position, ScoreKind, Shape};
use rstest::rstest;
use std::io::{Cursor, Write};
use tempfile::NamedTempFile;

const MESH_COLLECTION: &str = r#"{
  "name": "mesh_a",
  "parameters": { "num_images": 6, "osc_start": 10.0, "osc_range": 0.5 },
  "path_template": { "directory": "/data/a", "base_prefix": "mesh" },
  "layout": {
    "type": "mesh",
    "grid": { "steps_x": 3, "steps_y": 2, "spacing": [0.1, 0.2], "centre": { "phiy": 1.0 } }
  }
}"#;

// --- DATA COLLECTION ---

#[test]
fn test_mesh_collection_defaults() {
    let dc = read_collection(Cursor::new(MESH_COLLECTION)).unwrap();
    assert!(dc.is_mesh());
    assert!(!dc.collected);
    assert_eq!(dc.parameters.first_image, 1);
    assert_eq!(dc.path_template.image_path(3), "/data/a/mesh_1_0003.cbf");
    assert_eq!(dc.grid().unwrap().size(), (3, 2));
}

#[test]
fn test_grid_must_match_image_count() {
    let bad = MESH_COLLECTION.replace("\"num_images\": 6", "\"num_images\": 7");
    assert!(read_collection(Cursor::new(bad)).is_err());
}

#[test]
fn test_line_collection_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
          "name": "line_b",
          "parameters": {{ "num_images": 4 }},
          "path_template": {{ "directory": "/data/b", "base_prefix": "line", "run_number": 2 }},
          "layout": {{ "type": "line", "start": {{ "phiy": 0.0 }}, "end": {{ "phiy": 1.0 }} }},
          "collected": true
        }}"#
    )
    .unwrap();

    let dc = load_collection(file.path()).unwrap();
    assert!(!dc.is_mesh());
    assert!(dc.collected);
    let (start, end) = dc.centred_positions().unwrap();
    assert_eq!((start["phiy"], end["phiy"]), (0.0, 1.0));
}

#[test]
fn test_missing_collection_file() {
    assert!(load_collection("/nonexistent/dc.json").is_err());
}

// --- RESULTS ---

#[test]
fn test_mesh_results_are_column_major() {
    let json = r#"{
      "scores": {
        "score": [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
        "spots_num": [[0, 1], [2, 3], [4, 5]]
      },
      "best_positions": [ { "index": 5, "score": 6.0, "col": 2, "row": 1 } ]
    }"#;
    let loaded = read_results(Cursor::new(json)).unwrap();
    assert_eq!(loaded.grid.shape(), Shape::Mesh { cols: 3, rows: 2 });
    assert_eq!(
        loaded.grid.get(ScoreKind::Score, Position::Cell { col: 1, row: 0 }),
        Some(3.0)
    );
    assert_eq!(loaded.best_positions.len(), 1);
    assert!(loaded.best_positions[0].cpos.is_none());
}

#[test]
fn test_line_results_json() {
    let json = r#"{ "scores": { "spots_resolution": [0.1, 0.2, 0.3] } }"#;
    let loaded = read_results(Cursor::new(json)).unwrap();
    assert_eq!(loaded.grid.shape(), Shape::Line(3));
    assert!(loaded.best_positions.is_empty());
}

#[test]
fn test_mixed_or_empty_results_rejected() {
    let mixed = r#"{ "scores": { "score": [1.0, 2.0], "spots_num": [[1.0], [2.0]] } }"#;
    assert!(read_results(Cursor::new(mixed)).is_err());
    assert!(read_results(Cursor::new(r#"{ "scores": {} }"#)).is_err());
    assert!(read_results(Cursor::new(r#"{ "scores": { "bogus": [1.0] } }"#)).is_err());
}

#[test]
fn test_line_csv_fills_gaps_and_skips_bad_rows() {
    let csv = "image,spots_resolution,score,spots_num\n\
               0, 0.1, 1.5, 3\n\
               2, 0.3, 4.5, 9\n\
               x, bad, row, here\n";
    let grid = read_line_csv(Cursor::new(csv), 3).unwrap();
    assert_eq!(grid.shape(), Shape::Line(3));
    assert_eq!(grid.values(ScoreKind::Score).unwrap(), &[1.5, 0.0, 4.5]);
    assert_eq!(grid.values(ScoreKind::SpotsNum).unwrap(), &[3.0, 0.0, 9.0]);
}

#[rstest]
#[case("18446744073709551615")]
#[case("4000000000")]
#[case("4")]
fn test_line_csv_skips_images_past_the_scan(#[case] image: &str) {
    let csv = format!(
        "image,spots_resolution,score,spots_num\n\
         1, 0.2, 2.5, 5\n\
         {image}, 1.0, 2.0, 3.0\n"
    );
    let grid = read_line_csv(Cursor::new(csv), 4).unwrap();
    assert_eq!(grid.shape(), Shape::Line(4));
    assert_eq!(grid.values(ScoreKind::Score).unwrap(), &[0.0, 2.5, 0.0, 0.0]);
}

#[test]
fn test_line_csv_sized_by_scan_not_by_rows() {
    let csv = "image,spots_resolution,score,spots_num\n0, 0.1, 1.0, 1\n";
    let grid = read_line_csv(Cursor::new(csv), 5).unwrap();
    assert_eq!(grid.shape(), Shape::Line(5));
}

#[test]
fn test_results_reader_chosen_by_extension() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "image,spots_resolution,score,spots_num").unwrap();
    writeln!(file, "0,0.2,1.0,2").unwrap();
    let loaded = load_any_results(file.path(), 1).unwrap();
    assert_eq!(loaded.grid.shape(), Shape::Line(1));
}
