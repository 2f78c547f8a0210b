use super::ViewArgs;
use crate::reports;
use clap::Args;
use hitmap::palette::Palette;
use hitmap::HitMapViewer;
use std::process;
use tracing::{error, info};

#[derive(Args, Debug, Clone)]
pub struct PointsArgs {
    #[command(flatten)]
    pub config: hitmap::config::Config,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Print the hit points as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: PointsArgs, viewer: &mut HitMapViewer, palette: &Palette) {
    args.view.apply(viewer);

    let points = viewer.hit_points();
    info!("🎯 {} cells pass the threshold", points.len());

    if args.json {
        match serde_json::to_string_pretty(&points) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        }
        return;
    }

    reports::print_status(viewer, palette);
    reports::tables::print_hit_points(&points);
    reports::tables::print_requests(&viewer.create_hit_points());
}
