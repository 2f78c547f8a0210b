use crate::reports;
use clap::{Args, ValueEnum};
use hitmap::translator::GridPoint;
use hitmap::palette::Palette;
use hitmap::HitMapViewer;
use tracing::warn;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CentringPoint,
    HelicalLine,
    RotateHelical,
    Move,
    DisplayImage,
    Relaunch,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub config: hitmap::config::Config,

    /// Column (or image index for line scans), display orientation.
    #[arg(short = 'x', long)]
    pub x: f64,

    /// Row, display orientation (row 0 on top).
    #[arg(short = 'y', long, default_value_t = 0.0)]
    pub y: f64,

    #[arg(long, value_enum)]
    pub action: Vec<Action>,
}

pub fn run(args: InspectArgs, viewer: &mut HitMapViewer, palette: &Palette) {
    viewer.select(GridPoint::new(args.x, args.y));
    reports::print_status(viewer, palette);

    match viewer.image_parameters() {
        Some(p) => {
            println!("\nLine {}, image {} -> {}", p.line, p.image, p.path);
            if let Some(info) = viewer.image_info() {
                println!("{}", info);
            }
            if let Some(tooltip) = viewer.tooltip() {
                println!("{}", tooltip);
            }
        }
        None => warn!("No image at ({}, {})", args.x, args.y),
    }

    let mut requests = Vec::new();
    for action in &args.action {
        match action {
            Action::CentringPoint => requests.extend(viewer.create_centring_point(None)),
            Action::HelicalLine => requests.extend(viewer.create_helical_line()),
            Action::RotateHelical => requests.extend(viewer.rotate_and_create_helical_line()),
            Action::Move => requests.extend(viewer.move_to_selected_position()),
            Action::DisplayImage => requests.extend(viewer.display_image()),
            Action::Relaunch => requests.extend(viewer.relaunch_processing()),
        }
    }
    if !args.action.is_empty() {
        reports::tables::print_requests(&requests);
    }
}
