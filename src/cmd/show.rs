use super::ViewArgs;
use crate::reports;
use clap::Args;
use hitmap::consts::LINE_AXIS_TICKS;
use hitmap::palette::Palette;
use hitmap::HitMapViewer;

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub config: hitmap::config::Config,

    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn run(args: ShowArgs, viewer: &mut HitMapViewer, palette: &Palette) {
    args.view.apply(viewer);

    reports::print_status(viewer, palette);
    match viewer.shape() {
        Some(shape) if shape.is_mesh() => reports::heatmap::print_mesh(viewer, palette),
        Some(_) => reports::heatmap::print_line(viewer, palette, LINE_AXIS_TICKS),
        None => println!("\n(no results)"),
    }
}
