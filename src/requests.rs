use crate::error::{HitMapError, HmResult};
use crate::geometry::MotorPositions;
use serde::Serialize;
use tracing::{debug, warn};

/// Work the viewer asks external collaborators to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Request {
    CreateCentringPoint { motors: MotorPositions },
    SelectAllPoints,
    /// `None` lets the sample view build the line from its own points.
    CreateHelicalLine { motors: Option<MotorPositions> },
    MoveToPositions { motors: MotorPositions, wait: bool },
    MoveOmegaRelative { degrees: f64 },
    DisplayImage { path: String },
    RelaunchProcessing { collection: String },
}

pub type CollaboratorResult = Result<(), String>;

pub trait SampleView {
    fn create_centring_point(&mut self, motors: &MotorPositions) -> CollaboratorResult;
    fn select_all_points(&mut self) -> CollaboratorResult;
    fn create_auto_line(&mut self, motors: Option<&MotorPositions>) -> CollaboratorResult;
}

pub trait Diffractometer {
    fn move_to_motors_positions(&mut self, motors: &MotorPositions, wait: bool) -> CollaboratorResult;
    fn move_omega_relative(&mut self, degrees: f64) -> CollaboratorResult;
}

pub trait ImageTracker {
    fn load_image(&mut self, path: &str) -> CollaboratorResult;
}

pub trait ProcessingService {
    fn run_processing(&mut self, collection: &str) -> CollaboratorResult;
}

/// Routes requests to their collaborators in order. Stops at the first
/// rejection; nothing is retried.
pub struct Dispatcher<'a> {
    pub sample_view: &'a mut dyn SampleView,
    pub diffractometer: &'a mut dyn Diffractometer,
    pub image_tracker: &'a mut dyn ImageTracker,
    pub processing: &'a mut dyn ProcessingService,
}

impl Dispatcher<'_> {
    pub fn dispatch(&mut self, request: &Request) -> HmResult<()> {
        debug!("Dispatching {:?}", request);
        let (collaborator, result) = match request {
            Request::CreateCentringPoint { motors } => {
                ("sample view", self.sample_view.create_centring_point(motors))
            }
            Request::SelectAllPoints => ("sample view", self.sample_view.select_all_points()),
            Request::CreateHelicalLine { motors } => (
                "sample view",
                self.sample_view.create_auto_line(motors.as_ref()),
            ),
            Request::MoveToPositions { motors, wait } => (
                "diffractometer",
                self.diffractometer.move_to_motors_positions(motors, *wait),
            ),
            Request::MoveOmegaRelative { degrees } => (
                "diffractometer",
                self.diffractometer.move_omega_relative(*degrees),
            ),
            Request::DisplayImage { path } => ("image tracker", self.image_tracker.load_image(path)),
            Request::RelaunchProcessing { collection } => (
                "processing",
                self.processing.run_processing(collection),
            ),
        };

        result.map_err(|reason| {
            warn!("{} rejected {:?}: {}", collaborator, request, reason);
            HitMapError::Collaborator {
                collaborator,
                reason,
            }
        })
    }

    pub fn dispatch_all(&mut self, requests: &[Request]) -> HmResult<usize> {
        for request in requests {
            self.dispatch(request)?;
        }
        Ok(requests.len())
    }
}
