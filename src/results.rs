use crate::error::{HitMapError, HmResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

/// The closed set of per-image figures reported by online processing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScoreKind {
    #[serde(rename = "spots_resolution")]
    #[strum(to_string = "spots_resolution", serialize = "resolution")]
    Resolution,
    Score,
    SpotsNum,
}

impl ScoreKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreKind::Resolution => "Resolution",
            ScoreKind::Score => "Score",
            ScoreKind::SpotsNum => "Spots num",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Line(usize),
    Mesh { cols: usize, rows: usize },
}

impl Shape {
    pub fn len(&self) -> usize {
        match *self {
            Shape::Line(n) => n,
            Shape::Mesh { cols, rows } => cols * rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self, Shape::Mesh { .. })
    }

    /// Flat offset of a position, `None` when it falls outside the shape.
    pub fn offset(&self, position: Position) -> Option<usize> {
        match (*self, position) {
            (Shape::Line(n), Position::Image(i)) if i < n => Some(i),
            (Shape::Mesh { cols, rows }, Position::Cell { col, row }) if col < cols && row < rows => {
                Some(col * rows + row)
            }
            _ => None,
        }
    }

    pub fn position(&self, offset: usize) -> Position {
        match *self {
            Shape::Line(_) => Position::Image(offset),
            Shape::Mesh { rows, .. } => Position::Cell {
                col: offset / rows,
                row: offset % rows,
            },
        }
    }
}

/// Where a value lives inside a `ScoreGrid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Image(usize),
    Cell { col: usize, row: usize },
}

/// Raw per-image scores for one acquisition. Mesh arrays are `[col][row]`
/// flattened column-major, rows in display orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreGrid {
    shape: Shape,
    arrays: BTreeMap<ScoreKind, Vec<f32>>,
}

impl ScoreGrid {
    pub fn line(arrays: BTreeMap<ScoreKind, Vec<f32>>) -> HmResult<Self> {
        let n = arrays.values().next().map(Vec::len).unwrap_or(0);
        Self::validated(Shape::Line(n), arrays)
    }

    /// Builds a mesh grid from `[col][row]` nested arrays.
    pub fn mesh(arrays: BTreeMap<ScoreKind, Vec<Vec<f32>>>) -> HmResult<Self> {
        let cols = arrays.values().next().map(Vec::len).unwrap_or(0);
        let rows = arrays
            .values()
            .next()
            .and_then(|a| a.first())
            .map(Vec::len)
            .unwrap_or(0);

        let mut flat = BTreeMap::new();
        for (kind, columns) in arrays {
            if columns.iter().any(|c| c.len() != rows) {
                return Err(HitMapError::Validation(format!(
                    "'{}' is not a rectangular {}x{} array",
                    kind, cols, rows
                )));
            }
            flat.insert(kind, columns.into_iter().flatten().collect());
        }
        Self::validated(Shape::Mesh { cols, rows }, flat)
    }

    pub fn zeros(shape: Shape) -> Self {
        let arrays = ScoreKind::iter()
            .map(|k| (k, vec![0.0; shape.len()]))
            .collect();
        Self { shape, arrays }
    }

    fn validated(shape: Shape, arrays: BTreeMap<ScoreKind, Vec<f32>>) -> HmResult<Self> {
        if arrays.is_empty() {
            return Err(HitMapError::Validation(
                "results contain no score arrays".to_string(),
            ));
        }
        for (kind, values) in &arrays {
            if values.len() != shape.len() {
                return Err(HitMapError::Validation(format!(
                    "'{}' has {} values, expected {}",
                    kind,
                    values.len(),
                    shape.len()
                )));
            }
        }
        Ok(Self { shape, arrays })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn kinds(&self) -> impl Iterator<Item = ScoreKind> + '_ {
        self.arrays.keys().copied()
    }

    pub fn values(&self, kind: ScoreKind) -> Option<&[f32]> {
        self.arrays.get(&kind).map(Vec::as_slice)
    }

    pub fn get(&self, kind: ScoreKind, position: Position) -> Option<f32> {
        let offset = self.shape.offset(position)?;
        self.arrays.get(&kind).map(|v| v[offset])
    }

    fn set(&mut self, kind: ScoreKind, offset: usize, value: f32) {
        let len = self.shape.len();
        self.arrays
            .entry(kind)
            .or_insert_with(|| vec![0.0; len])[offset] = value;
    }
}

/// One streamed value for a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePatch {
    /// Acquisition sequence number of the image (0-based).
    pub image: usize,
    pub position: Position,
    pub scores: BTreeMap<ScoreKind, f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultUpdate {
    Snapshot(ScoreGrid),
    Patch(Vec<ScorePatch>),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MergePolicy {
    /// Drop patch entries older than the newest image already merged.
    #[default]
    RejectStale,
    /// Always write, whatever the arrival order.
    Overwrite,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    pub applied: usize,
    pub rejected: usize,
}

/// Holds the raw scores of the acquisition currently shown.
#[derive(Debug, Default, Clone)]
pub struct ResultStore {
    raw: Option<ScoreGrid>,
    newest_image: Option<usize>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
    }

    pub fn raw(&self) -> Option<&ScoreGrid> {
        self.raw.as_ref()
    }

    pub fn shape(&self) -> Option<Shape> {
        self.raw.as_ref().map(ScoreGrid::shape)
    }

    pub fn replace(&mut self, results: ScoreGrid) {
        debug!("Result store replaced, shape {:?}", results.shape());
        self.raw = Some(results);
        self.newest_image = None;
    }

    /// Merges into the current arrays without resizing them. Returns `None`
    /// when the store is empty and nothing could be merged.
    pub fn merge(&mut self, update: ResultUpdate, policy: MergePolicy) -> Option<MergeOutcome> {
        let raw = self.raw.as_mut()?;

        match update {
            ResultUpdate::Snapshot(grid) => {
                if grid.shape() != raw.shape() {
                    warn!(
                        "Ignoring result snapshot with shape {:?} (store holds {:?})",
                        grid.shape(),
                        raw.shape()
                    );
                    return Some(MergeOutcome {
                        applied: 0,
                        rejected: 1,
                    });
                }
                *raw = grid;
                Some(MergeOutcome {
                    applied: 1,
                    rejected: 0,
                })
            }
            ResultUpdate::Patch(patches) => {
                let mut outcome = MergeOutcome::default();
                for patch in patches {
                    let stale = self.newest_image.is_some_and(|newest| patch.image < newest);
                    if stale && policy == MergePolicy::RejectStale {
                        warn!(
                            "Rejecting out-of-order result for image {} (newest merged: {:?})",
                            patch.image, self.newest_image
                        );
                        outcome.rejected += 1;
                        continue;
                    }

                    let Some(offset) = raw.shape().offset(patch.position) else {
                        warn!(
                            "Ignoring result at {:?}: outside {:?}",
                            patch.position,
                            raw.shape()
                        );
                        outcome.rejected += 1;
                        continue;
                    };

                    for (kind, value) in patch.scores {
                        raw.set(kind, offset, value);
                    }
                    self.newest_image = Some(self.newest_image.map_or(patch.image, |n| n.max(patch.image)));
                    outcome.applied += 1;
                }
                Some(outcome)
            }
        }
    }

    pub fn clear(&mut self) {
        self.raw = None;
        self.newest_image = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(image: usize, value: f32) -> ScorePatch {
        ScorePatch {
            image,
            position: Position::Image(image),
            scores: BTreeMap::from([(ScoreKind::Score, value)]),
        }
    }

    #[test]
    fn test_kind_parsing_accepts_wire_names() {
        assert_eq!("spots_resolution".parse::<ScoreKind>().unwrap(), ScoreKind::Resolution);
        assert_eq!("Score".parse::<ScoreKind>().unwrap(), ScoreKind::Score);
        assert_eq!("spots_num".parse::<ScoreKind>().unwrap(), ScoreKind::SpotsNum);
        assert_eq!(ScoreKind::Resolution.to_string(), "spots_resolution");
    }

    #[test]
    fn test_zeros_holds_every_kind() {
        let grid = ScoreGrid::zeros(Shape::Mesh { cols: 2, rows: 3 });
        assert_eq!(grid.kinds().count(), 3);
        for kind in ScoreKind::iter() {
            assert_eq!(grid.values(kind).unwrap(), &[0.0; 6]);
        }
    }

    #[test]
    fn test_mismatched_shapes_rejected() {
        let arrays = BTreeMap::from([
            (ScoreKind::Score, vec![1.0, 2.0, 3.0]),
            (ScoreKind::SpotsNum, vec![1.0, 2.0]),
        ]);
        assert!(ScoreGrid::line(arrays).is_err());

        let ragged = BTreeMap::from([(ScoreKind::Score, vec![vec![1.0, 2.0], vec![3.0]])]);
        assert!(ScoreGrid::mesh(ragged).is_err());
    }

    #[test]
    fn test_merge_on_empty_store_is_noop() {
        let mut store = ResultStore::new();
        let outcome = store.merge(ResultUpdate::Patch(vec![patch(0, 1.0)]), MergePolicy::Overwrite);
        assert!(outcome.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_stale_patches_follow_policy() {
        let mut store = ResultStore::new();
        store.replace(ScoreGrid::zeros(Shape::Line(4)));

        store.merge(ResultUpdate::Patch(vec![patch(2, 5.0)]), MergePolicy::RejectStale);
        let outcome = store
            .merge(ResultUpdate::Patch(vec![patch(1, 7.0)]), MergePolicy::RejectStale)
            .unwrap();
        assert_eq!(outcome.rejected, 1);
        assert_eq!(store.raw().unwrap().get(ScoreKind::Score, Position::Image(1)), Some(0.0));

        let outcome = store
            .merge(ResultUpdate::Patch(vec![patch(1, 7.0)]), MergePolicy::Overwrite)
            .unwrap();
        assert_eq!(outcome.applied, 1);
        assert_eq!(store.raw().unwrap().get(ScoreKind::Score, Position::Image(1)), Some(7.0));
    }

    #[test]
    fn test_out_of_bounds_patch_does_not_resize() {
        let mut store = ResultStore::new();
        store.replace(ScoreGrid::zeros(Shape::Line(2)));
        let outcome = store
            .merge(ResultUpdate::Patch(vec![patch(9, 1.0)]), MergePolicy::Overwrite)
            .unwrap();
        assert_eq!(outcome.rejected, 1);
        assert_eq!(store.shape(), Some(Shape::Line(2)));
    }
}
