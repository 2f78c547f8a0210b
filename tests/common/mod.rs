#![allow(dead_code)]
use hitmap::acquisition::{AcquisitionParameters, DataCollection, PathTemplate};
use hitmap::config::ViewerParams;
use hitmap::geometry::{MeshGrid, MotorPositions};
use hitmap::ranking::BestPosition;
use hitmap::results::{ScoreGrid, ScoreKind};
use hitmap::HitMapViewer;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use std::rc::Rc;

pub fn motors(entries: &[(&str, f64)]) -> MotorPositions {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub fn template(prefix: &str) -> PathTemplate {
    PathTemplate {
        directory: "/data/test".to_string(),
        base_prefix: prefix.to_string(),
        run_number: 1,
        suffix: "cbf".to_string(),
        precision: 4,
    }
}

pub fn mesh_grid(cols: usize, rows: usize) -> MeshGrid {
    MeshGrid::new(
        cols,
        rows,
        (1.0, 1.0),
        motors(&[("phi", 0.0), ("phiy", 0.0), ("phiz", 0.0)]),
    )
}

pub fn mesh_collection(cols: usize, rows: usize) -> Rc<DataCollection> {
    let params = AcquisitionParameters::builder()
        .num_images(cols * rows)
        .build();
    Rc::new(DataCollection::mesh("mesh", params, template("mesh"), mesh_grid(cols, rows)).with_collected(true))
}

pub fn line_collection(num_images: usize) -> Rc<DataCollection> {
    let params = AcquisitionParameters::builder()
        .num_images(num_images)
        .osc_start(10.0)
        .osc_range(1.0)
        .build();
    Rc::new(
        DataCollection::line(
            "line",
            params,
            template("line"),
            motors(&[("phiy", 0.0), ("phiz", 1.0)]),
            motors(&[("phiy", 10.0), ("phiz", 1.0)]),
        )
        .with_collected(true),
    )
}

/// All three kinds set to the same `[col][row]` values.
pub fn mesh_scores(columns: Vec<Vec<f32>>) -> ScoreGrid {
    let arrays = ScoreKind::iter()
        .map(|k| (k, columns.clone()))
        .collect::<BTreeMap<_, _>>();
    ScoreGrid::mesh(arrays).unwrap()
}

pub fn line_scores(values: Vec<f32>) -> ScoreGrid {
    let arrays = ScoreKind::iter()
        .map(|k| (k, values.clone()))
        .collect::<BTreeMap<_, _>>();
    ScoreGrid::line(arrays).unwrap()
}

pub fn best(index: usize, score: f32) -> BestPosition {
    BestPosition {
        index,
        score,
        spots_num: 0,
        spots_int_aver: 0.0,
        spots_resolution: 0.0,
        filename: format!("/data/test/mesh_1_{:04}.cbf", index + 1),
        col: 0,
        row: 0,
        cpos: Some(motors(&[("phiy", index as f64)])),
    }
}

pub fn viewer_for(collection: &Rc<DataCollection>) -> HitMapViewer {
    let mut viewer = HitMapViewer::new(ViewerParams::default());
    viewer.associate(collection);
    viewer
}
