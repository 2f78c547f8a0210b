use crate::reports;
use clap::Args;
use hitmap::palette::Palette;
use hitmap::HitMapViewer;

#[derive(Args, Debug, Clone)]
pub struct BestArgs {
    #[command(flatten)]
    pub config: hitmap::config::Config,

    /// Also print the requests for the given table row (1-based).
    #[arg(long)]
    pub row: Option<usize>,
}

pub fn run(args: BestArgs, viewer: &HitMapViewer, palette: &Palette) {
    reports::print_status(viewer, palette);
    reports::tables::print_best_positions(&viewer.best_position_table());

    if let Some(row) = args.row {
        let idx = row.saturating_sub(1);
        let requests: Vec<_> = [
            viewer.move_to_best_position(idx),
            viewer.create_best_centring_point(idx),
            viewer.display_best_image(idx),
        ]
        .into_iter()
        .flatten()
        .collect();
        reports::tables::print_requests(&requests);
    }
}
