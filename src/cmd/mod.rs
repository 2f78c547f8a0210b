use clap::Args;
use hitmap::{HitMapViewer, ScoreKind};
use tracing::info;

pub mod best;
pub mod inspect;
pub mod points;
pub mod show;

/// Kind and threshold selection shared by the map views.
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Score kind to display (spots_resolution, score, spots_num).
    #[arg(long)]
    pub kind: Option<ScoreKind>,

    /// Threshold slider position, 0-100 % of the maximum.
    #[arg(short, long, default_value_t = 0)]
    pub threshold: u32,
}

impl ViewArgs {
    pub fn apply(&self, viewer: &mut HitMapViewer) {
        if let Some(kind) = self.kind {
            viewer.select_kind(kind);
        }
        viewer.set_threshold_percent(self.threshold);
        info!(
            "🎚️  Showing '{}' above {:.0}% of max",
            viewer.kind().label(),
            viewer.threshold() * 100.0
        );
    }
}
