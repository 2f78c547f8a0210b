use crate::acquisition::{AcquisitionParameters, DataCollection, PathTemplate};
use crate::error::{HitMapError, HmResult};
use crate::geometry::{MeshGrid, MotorPositions};
use crate::ranking::BestPosition;
use crate::results::{ScoreGrid, ScoreKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

fn open(path: &Path) -> HmResult<BufReader<File>> {
    debug!("Reading {}", path.display());
    let file = File::open(path).map_err(|e| {
        warn!("Could not open '{}': {}", path.display(), e);
        e
    })?;
    Ok(BufReader::new(file))
}

// --- DATA COLLECTION ---

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LayoutSpec {
    Mesh {
        grid: MeshGrid,
    },
    Line {
        start: MotorPositions,
        end: MotorPositions,
    },
}

#[derive(Debug, Deserialize)]
struct CollectionSpec {
    name: String,
    parameters: AcquisitionParameters,
    path_template: PathTemplate,
    layout: LayoutSpec,
    #[serde(default)]
    collected: bool,
}

pub fn read_collection<R: Read>(reader: R) -> HmResult<DataCollection> {
    let spec: CollectionSpec = serde_json::from_reader(reader)?;

    let collection = match spec.layout {
        LayoutSpec::Mesh { grid } => {
            if grid.num_images() != spec.parameters.num_images {
                return Err(HitMapError::Validation(format!(
                    "'{}': grid holds {} images but {} were acquired",
                    spec.name,
                    grid.num_images(),
                    spec.parameters.num_images
                )));
            }
            DataCollection::mesh(&spec.name, spec.parameters, spec.path_template, grid)
        }
        LayoutSpec::Line { start, end } => {
            DataCollection::line(&spec.name, spec.parameters, spec.path_template, start, end)
        }
    };
    Ok(collection.with_collected(spec.collected))
}

pub fn load_collection<P: AsRef<Path>>(path: P) -> HmResult<DataCollection> {
    read_collection(open(path.as_ref())?)
}

// --- RESULTS (JSON) ---

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScoreArray {
    Line(Vec<f32>),
    Mesh(Vec<Vec<f32>>),
}

#[derive(Debug, Deserialize)]
struct ResultsFile {
    scores: BTreeMap<ScoreKind, ScoreArray>,
    #[serde(default)]
    best_positions: Vec<BestPosition>,
}

#[derive(Debug, Clone)]
pub struct LoadedResults {
    pub grid: ScoreGrid,
    pub best_positions: Vec<BestPosition>,
}

/// Scores are either all 1-D (line scan) or all `[col][row]` (mesh).
pub fn read_results<R: Read>(reader: R) -> HmResult<LoadedResults> {
    let file: ResultsFile = serde_json::from_reader(reader)?;

    let mut lines = BTreeMap::new();
    let mut meshes = BTreeMap::new();
    for (kind, array) in file.scores {
        match array {
            ScoreArray::Line(values) => {
                lines.insert(kind, values);
            }
            ScoreArray::Mesh(columns) => {
                meshes.insert(kind, columns);
            }
        }
    }

    let grid = match (lines.is_empty(), meshes.is_empty()) {
        (false, true) => ScoreGrid::line(lines)?,
        (true, false) => ScoreGrid::mesh(meshes)?,
        (true, true) => {
            return Err(HitMapError::Validation(
                "results contain no score arrays".to_string(),
            ))
        }
        (false, false) => {
            return Err(HitMapError::Validation(
                "results mix 1-D and 2-D score arrays".to_string(),
            ))
        }
    };

    debug!(
        "Loaded {:?} results, {} best positions",
        grid.shape(),
        file.best_positions.len()
    );
    Ok(LoadedResults {
        grid,
        best_positions: file.best_positions,
    })
}

pub fn load_results<P: AsRef<Path>>(path: P) -> HmResult<LoadedResults> {
    read_results(open(path.as_ref())?)
}

// --- RESULTS (line-scan CSV) ---

#[derive(Debug, Deserialize)]
struct LineRow {
    image: usize,
    spots_resolution: f32,
    score: f32,
    spots_num: f32,
}

/// `image,spots_resolution,score,spots_num` rows for a scan of `num_images`
/// images. Images missing from the file read as zero; malformed rows and
/// rows past the end of the scan are skipped.
pub fn read_line_csv<R: Read>(reader: R, num_images: usize) -> HmResult<ScoreGrid> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (row_idx, result) in rdr.deserialize::<LineRow>().enumerate() {
        match result {
            Ok(row) if row.image < num_images => rows.push(row),
            Ok(row) => {
                warn!(
                    "[Row {}] image {} outside a scan of {} images",
                    row_idx + 1,
                    row.image,
                    num_images
                );
                skipped += 1;
            }
            Err(e) => {
                warn!("[Row {}] {}", row_idx + 1, e);
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {} invalid rows", skipped);
    }

    let mut resolution = vec![0.0; num_images];
    let mut score = vec![0.0; num_images];
    let mut spots = vec![0.0; num_images];
    for row in rows {
        resolution[row.image] = row.spots_resolution;
        score[row.image] = row.score;
        spots[row.image] = row.spots_num;
    }

    ScoreGrid::line(BTreeMap::from([
        (ScoreKind::Resolution, resolution),
        (ScoreKind::Score, score),
        (ScoreKind::SpotsNum, spots),
    ]))
}

pub fn load_line_csv<P: AsRef<Path>>(path: P, num_images: usize) -> HmResult<ScoreGrid> {
    read_line_csv(open(path.as_ref())?, num_images)
}

/// Picks the reader from the file extension. `num_images` sizes CSV
/// results, JSON results carry their own shape.
pub fn load_any_results<P: AsRef<Path>>(path: P, num_images: usize) -> HmResult<LoadedResults> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(LoadedResults {
            grid: load_line_csv(path, num_images)?,
            best_positions: Vec::new(),
        }),
        _ => load_results(path),
    }
}
