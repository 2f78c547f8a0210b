use crate::acquisition::{DataCollection, ScanLayout};
use crate::centring::{omega_at, point_from_line};
use crate::config::ViewerParams;
use crate::consts::HALF_CELL;
use crate::events::{EventHub, Subscription};
use crate::filter::{max_value, FilterState};
use crate::geometry::{GridGeometry, MotorPositions};
use crate::ranking::{rank_best_positions, BestPosition};
use crate::requests::Request;
use crate::results::{
    MergeOutcome, Position, ResultStore, ResultUpdate, ScoreGrid, ScoreKind, Shape,
};
use crate::translator::{CoordinateTranslator, GridPoint};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use strum_macros::Display;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum ViewerState {
    /// No results.
    Empty,
    /// Results streaming in during acquisition.
    Live,
    /// Acquisition finished, results frozen.
    Final,
}

/// A cell (or image) that passed the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitPoint {
    pub cell: Position,
    pub value: f32,
    /// Cell centre as drawn on the plot.
    pub display: GridPoint,
    /// Cell centre handed to the grid geometry (row-flipped for meshes).
    pub grid: GridPoint,
    pub motors: MotorPositions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageParameters {
    pub image: usize,
    pub line: usize,
    pub image_num: usize,
    pub path: String,
}

/// Notifications pushed by the acquisition / processing pipeline.
#[derive(Debug, Clone)]
pub enum AcquisitionEvent {
    ResultsReady {
        results: ScoreGrid,
        best_positions: Vec<BestPosition>,
    },
    ResultsUpdated(ResultUpdate),
    Finished,
    Reset,
}

/// Result viewer session for one data collection at a time.
pub struct HitMapViewer {
    params: ViewerParams,
    store: ResultStore,
    filter: FilterState,
    kind: ScoreKind,
    first_result: bool,
    state: ViewerState,
    collection: Option<Weak<DataCollection>>,
    grid: Option<Weak<dyn GridGeometry>>,
    best_positions: Vec<BestPosition>,
    selected: GridPoint,
}

impl HitMapViewer {
    pub fn new(params: ViewerParams) -> Self {
        Self {
            kind: params.mesh_score_kind,
            params,
            store: ResultStore::new(),
            filter: FilterState::default(),
            first_result: true,
            state: ViewerState::Empty,
            collection: None,
            grid: None,
            best_positions: Vec::new(),
            selected: GridPoint::default(),
        }
    }

    // === STATE ===

    pub fn params(&self) -> &ViewerParams {
        &self.params
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn kind(&self) -> ScoreKind {
        self.kind
    }

    pub fn threshold(&self) -> f32 {
        self.filter.fraction()
    }

    pub fn selected(&self) -> GridPoint {
        self.selected
    }

    pub fn shape(&self) -> Option<Shape> {
        self.store.shape()
    }

    pub fn raw(&self) -> Option<&ScoreGrid> {
        self.store.raw()
    }

    pub fn collection(&self) -> Option<Rc<DataCollection>> {
        self.collection.as_ref().and_then(Weak::upgrade)
    }

    pub fn grid(&self) -> Option<Rc<dyn GridGeometry>> {
        self.grid.as_ref().and_then(Weak::upgrade)
    }

    // === RESULT STORE ===

    /// Binds a new data collection, dropping everything shown before.
    pub fn associate(&mut self, collection: &Rc<DataCollection>) {
        self.clean();
        info!(
            "Viewer associated with '{}' ({})",
            collection.name,
            if collection.is_mesh() { "mesh" } else { "line" }
        );
        self.collection = Some(Rc::downgrade(collection));
        self.grid = collection.grid().map(Rc::downgrade);
    }

    pub fn set_results(&mut self, results: ScoreGrid) {
        let is_mesh = results.shape().is_mesh();
        self.store.replace(results);
        self.filter.reset();

        if self.first_result {
            self.kind = self.params.default_kind(is_mesh);
            debug!("First results, showing '{}'", self.kind);
        }
        self.first_result = false;
        self.state = ViewerState::Live;
    }

    pub fn set_best_positions(&mut self, best_positions: Vec<BestPosition>) {
        self.best_positions = best_positions;
    }

    /// Merges streamed results. An empty viewer adopts a snapshot as if it
    /// had been passed to `set_results`; a patch is dropped.
    pub fn update_results(&mut self, update: ResultUpdate) -> Option<MergeOutcome> {
        match self.state {
            ViewerState::Final => {
                debug!("Ignoring result update: acquisition already finished");
                None
            }
            ViewerState::Empty => match update {
                ResultUpdate::Snapshot(grid) => {
                    self.set_results(grid);
                    Some(MergeOutcome {
                        applied: 1,
                        rejected: 0,
                    })
                }
                ResultUpdate::Patch(_) => {
                    debug!("Ignoring result patch: no results set");
                    None
                }
            },
            ViewerState::Live => self.store.merge(update, self.params.merge_policy),
        }
    }

    /// Acquisition completion. Only a live viewer is frozen.
    pub fn finish(&mut self) {
        if self.state == ViewerState::Live {
            info!("Results final, {} best positions", self.best_positions.len());
            self.state = ViewerState::Final;
        }
    }

    pub fn clean(&mut self) {
        self.store.clear();
        self.filter.reset();
        self.collection = None;
        self.grid = None;
        self.best_positions.clear();
        self.selected = GridPoint::default();
        self.first_result = true;
        self.state = ViewerState::Empty;
    }

    // === FILTER ===

    pub fn select_kind(&mut self, kind: ScoreKind) {
        self.kind = kind;
    }

    pub fn set_threshold(&mut self, fraction: f32) {
        if !(0.0..=1.0).contains(&fraction) {
            warn!("Threshold {} outside [0, 1], clamping", fraction);
        }
        self.filter.set_fraction(fraction);
    }

    pub fn set_threshold_percent(&mut self, percent: u32) {
        self.filter.set_percent(percent);
    }

    pub fn raw_values(&self) -> Option<&[f32]> {
        self.store.raw()?.values(self.kind)
    }

    /// Raw values of the shown kind with sub-threshold cells zeroed.
    pub fn display_values(&self) -> Option<Vec<f32>> {
        self.raw_values().map(|raw| self.filter.apply(raw))
    }

    pub fn display_max(&self) -> f32 {
        self.display_values().map(|v| max_value(&v)).unwrap_or(0.0)
    }

    // === COORDINATES ===

    fn osc_range(&self) -> f64 {
        self.collection()
            .map(|c| c.parameters.osc_range)
            .unwrap_or(0.0)
    }

    pub fn image_line_to_col_row(&self, image: usize, line: usize) -> Option<(usize, usize)> {
        let grid = self.grid();
        CoordinateTranslator::new(grid.as_deref(), self.store.shape(), self.osc_range())
            .image_line_to_col_row(image, line)
    }

    /// `col`/`row` in geometry space.
    pub fn col_row_to_motor_positions(&self, col: f64, row: f64) -> Option<MotorPositions> {
        let grid = self.grid();
        CoordinateTranslator::new(grid.as_deref(), self.store.shape(), self.osc_range())
            .col_row_to_motor_positions(col, row)
    }

    pub fn pixel_to_grid(&self, pos_x: f64, pos_y: f64) -> GridPoint {
        let grid = self.grid();
        CoordinateTranslator::new(grid.as_deref(), self.store.shape(), self.osc_range())
            .pixel_to_grid(pos_x, pos_y)
    }

    /// Moves the cursor when the pointer crosses into another cell. With
    /// continuous image display on, the image under the cursor is requested.
    pub fn hover(&mut self, pos_x: f64, pos_y: f64) -> Vec<Request> {
        let point = self.pixel_to_grid(pos_x, pos_y);
        let mut moved = false;

        if (point.x.trunc() - self.selected.x.trunc()).abs() >= 1.0 {
            self.selected.x = point.x;
            moved = true;
        }
        if (point.y.trunc() - self.selected.y.trunc()).abs() >= 1.0 {
            self.selected.y = point.y;
            moved = true;
        }

        if moved && self.params.continuous_image_display {
            return self.display_image().into_iter().collect();
        }
        Vec::new()
    }

    pub fn select(&mut self, point: GridPoint) {
        self.selected = point;
    }

    fn line_centring_motors(&self, collection: &DataCollection, coord_x: f64) -> Option<MotorPositions> {
        let (start, end) = collection.centred_positions()?;
        let p = &collection.parameters;
        let mut motors = point_from_line(start, end, coord_x, p.num_images);
        motors.insert(
            self.params.omega_motor.clone(),
            omega_at(p.osc_start, p.osc_range, coord_x, p.num_images),
        );
        Some(motors)
    }

    /// Motor positions for a display-space point.
    fn centring_motors_at(&self, point: GridPoint) -> Option<MotorPositions> {
        let collection = self.collection()?;
        match &collection.layout {
            ScanLayout::Mesh(_) => {
                let grid = self.grid();
                let translator = CoordinateTranslator::new(
                    grid.as_deref(),
                    self.store.shape(),
                    collection.parameters.osc_range,
                );
                let at = translator.display_to_grid(point);
                translator.col_row_to_motor_positions(at.x, at.y)
            }
            ScanLayout::Line { .. } => self.line_centring_motors(&collection, point.x),
        }
    }

    // === SELECTION ===

    /// Every nonzero displayed cell, centred, with its motor positions.
    pub fn hit_points(&self) -> Vec<HitPoint> {
        let (Some(shape), Some(display)) = (self.store.shape(), self.display_values()) else {
            return Vec::new();
        };
        let Some(collection) = self.collection() else {
            debug!("No data collection associated, no hit points");
            return Vec::new();
        };

        let grid = self.grid();
        let translator =
            CoordinateTranslator::new(grid.as_deref(), Some(shape), collection.parameters.osc_range);

        let mut points = Vec::new();
        for (offset, &value) in display.iter().enumerate() {
            if value == 0.0 || value.is_nan() {
                continue;
            }
            let cell = shape.position(offset);
            let hit = match cell {
                Position::Cell { col, row } => {
                    let display = GridPoint::new(col as f64 + HALF_CELL, row as f64 + HALF_CELL);
                    let at = translator.display_to_grid(display);
                    translator
                        .col_row_to_motor_positions(at.x, at.y)
                        .map(|motors| (display, at, motors))
                }
                Position::Image(image) => {
                    let display = GridPoint::new(image as f64 + HALF_CELL, 0.0);
                    self.line_centring_motors(&collection, display.x)
                        .map(|motors| (display, display, motors))
                }
            };

            match hit {
                Some((display, grid, motors)) => points.push(HitPoint {
                    cell,
                    value,
                    display,
                    grid,
                    motors,
                }),
                None => {
                    debug!("No geometry to place {:?}, stopping", cell);
                    break;
                }
            }
        }
        points
    }

    pub fn create_hit_points(&self) -> Vec<Request> {
        let mut requests: Vec<Request> = self
            .hit_points()
            .into_iter()
            .map(|p| Request::CreateCentringPoint { motors: p.motors })
            .collect();
        if !requests.is_empty() {
            info!("Creating {} centring points", requests.len());
            requests.push(Request::SelectAllPoints);
        }
        requests
    }

    /// Centring point at `coord` (display space), or at the cursor.
    pub fn create_centring_point(&self, coord: Option<GridPoint>) -> Option<Request> {
        let motors = self.centring_motors_at(coord.unwrap_or(self.selected))?;
        Some(Request::CreateCentringPoint { motors })
    }

    pub fn create_helical_line(&self) -> Option<Request> {
        let collection = self.collection()?;
        if !collection.is_mesh() {
            return None;
        }
        let motors = self.centring_motors_at(self.selected)?;
        Some(Request::CreateHelicalLine {
            motors: Some(motors),
        })
    }

    pub fn rotate_and_create_helical_line(&self) -> Vec<Request> {
        let Some(mv) = self.move_to_selected_position() else {
            return Vec::new();
        };
        vec![
            mv,
            Request::MoveOmegaRelative {
                degrees: self.params.helical_rotation_deg,
            },
            Request::CreateHelicalLine { motors: None },
        ]
    }

    pub fn move_to_selected_position(&self) -> Option<Request> {
        let collection = self.collection()?;
        let motors = match &collection.layout {
            ScanLayout::Mesh(_) => self.centring_motors_at(self.selected)?,
            ScanLayout::Line { start, end } => point_from_line(
                start,
                end,
                self.selected.x.trunc().max(0.0),
                collection.parameters.num_images.saturating_sub(1),
            ),
        };
        Some(Request::MoveToPositions { motors, wait: true })
    }

    // === IMAGES ===

    pub fn image_parameters(&self) -> Option<ImageParameters> {
        let collection = self.collection()?;
        let (image, line, image_num) = match self.grid() {
            Some(grid) => {
                let translator =
                    CoordinateTranslator::new(Some(grid.as_ref()), self.store.shape(), 0.0);
                let at = translator.display_cell_to_grid(self.selected);
                let r = grid.image_from_col_row(at.x, at.y);
                (r.image, r.line, r.image_num)
            }
            None => {
                let image = self.selected.col();
                (image, 1, image + collection.parameters.first_image)
            }
        };
        Some(ImageParameters {
            image,
            line,
            image_num,
            path: collection.path_template.image_path(image_num),
        })
    }

    fn value_at_image(&self, kind: ScoreKind, image: usize, line: usize) -> Option<f32> {
        let raw = self.store.raw()?;
        let position = match self.image_line_to_col_row(image, line) {
            Some((col, row)) => Position::Cell { col, row },
            None => Position::Image(image),
        };
        raw.get(kind, position)
    }

    pub fn image_info(&self) -> Option<String> {
        let params = self.image_parameters()?;
        let value = self.value_at_image(self.kind, params.image, params.line)?;
        Some(format!("Image {}, value: {:.1}", params.image_num, value))
    }

    pub fn tooltip(&self) -> Option<String> {
        let params = self.image_parameters()?;
        let mut text = format!("Image no. {}", params.image_num);
        if let (Some(score), Some(spots)) = (
            self.value_at_image(ScoreKind::Score, params.image, params.line),
            self.value_at_image(ScoreKind::SpotsNum, params.image, params.line),
        ) {
            text.push_str(&format!(
                "\nTotal score: {:.1}\nNumber of spots: {}",
                score, spots as i64
            ));
        }
        Some(text)
    }

    fn image_request(&self, path: &str) -> Request {
        let path = match self.params.path_rewrite() {
            Some(rewrite) => rewrite.apply(path),
            None => path.to_string(),
        };
        Request::DisplayImage { path }
    }

    /// Only collected images can be shown.
    pub fn display_image(&self) -> Option<Request> {
        if !self.collection()?.collected {
            debug!("Images not collected yet");
            return None;
        }
        let params = self.image_parameters()?;
        Some(self.image_request(&params.path))
    }

    pub fn relaunch_processing(&self) -> Option<Request> {
        let collection = self.collection()?;
        if !collection.is_mesh() {
            return None;
        }
        Some(Request::RelaunchProcessing {
            collection: collection.name.clone(),
        })
    }

    /// Y-axis ticks of a line-scan plot. Resolution is plotted as 1/d, so
    /// its labels read back in Angstrom.
    pub fn axis_ticks(&self, count: usize) -> Vec<(f32, String)> {
        let Some(display) = self.display_values() else {
            return Vec::new();
        };
        if self.store.shape().is_some_and(|s| s.is_mesh()) || count == 0 {
            return Vec::new();
        }

        let max = max_value(&display);
        let step = if count > 1 { max / (count - 1) as f32 } else { 0.0 };
        (0..count)
            .map(|i| {
                let pos = step * i as f32;
                let label = match self.kind {
                    ScoreKind::Resolution if pos <= 0.0 => "inf".to_string(),
                    ScoreKind::Resolution => format!("{:.2}", 1.0 / pos),
                    _ => format!("{}", pos as i64),
                };
                (pos, label)
            })
            .collect()
    }

    // === BEST POSITIONS ===

    pub fn rank_best_positions(&self, n: usize) -> Vec<BestPosition> {
        if self.state == ViewerState::Empty {
            return Vec::new();
        }
        rank_best_positions(&self.best_positions, n)
    }

    /// The table as shown: ranked and cut to the configured length.
    pub fn best_position_table(&self) -> Vec<BestPosition> {
        self.rank_best_positions(self.params.best_positions_limit)
    }

    fn best_at(&self, row: usize) -> Option<BestPosition> {
        self.best_position_table().into_iter().nth(row)
    }

    pub fn move_to_best_position(&self, row: usize) -> Option<Request> {
        let motors = self.best_at(row)?.cpos?;
        Some(Request::MoveToPositions {
            motors,
            wait: false,
        })
    }

    pub fn create_best_centring_point(&self, row: usize) -> Option<Request> {
        let motors = self.best_at(row)?.cpos?;
        Some(Request::CreateCentringPoint { motors })
    }

    pub fn display_best_image(&self, row: usize) -> Option<Request> {
        let best = self.best_at(row)?;
        if best.filename.is_empty() {
            return None;
        }
        Some(self.image_request(&best.filename))
    }
}

/// Feeds acquisition events into a shared viewer until the returned
/// subscription is dropped.
pub fn bind_viewer(
    viewer: &Rc<RefCell<HitMapViewer>>,
    hub: &EventHub<AcquisitionEvent>,
) -> Subscription {
    let weak = Rc::downgrade(viewer);
    hub.subscribe(move |event: &AcquisitionEvent| {
        let Some(viewer) = weak.upgrade() else {
            return;
        };
        let Ok(mut viewer) = viewer.try_borrow_mut() else {
            warn!("Viewer busy, dropping {:?}", event);
            return;
        };
        match event {
            AcquisitionEvent::ResultsReady {
                results,
                best_positions,
            } => {
                viewer.set_results(results.clone());
                viewer.set_best_positions(best_positions.clone());
            }
            AcquisitionEvent::ResultsUpdated(update) => {
                viewer.update_results(update.clone());
            }
            AcquisitionEvent::Finished => viewer.finish(),
            AcquisitionEvent::Reset => viewer.clean(),
        }
    })
}
