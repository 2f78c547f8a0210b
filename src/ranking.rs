use crate::geometry::MotorPositions;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One entry of the best-position list reported by online processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPosition {
    pub index: usize,
    pub score: f32,
    #[serde(default)]
    pub spots_num: u32,
    #[serde(default)]
    pub spots_int_aver: f32,
    #[serde(default)]
    pub spots_resolution: f32,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub col: usize,
    #[serde(default)]
    pub row: usize,
    #[serde(default)]
    pub cpos: Option<MotorPositions>,
}

fn score_desc(a: &BestPosition, b: &BestPosition) -> Ordering {
    b.score.total_cmp(&a.score)
}

/// Top `n` positions by composite score, highest first. Ties keep the
/// reported order.
pub fn rank_best_positions(positions: &[BestPosition], n: usize) -> Vec<BestPosition> {
    let mut ranked = positions.to_vec();
    // `sort_by` is stable
    ranked.sort_by(score_desc);
    ranked.truncate(n);
    ranked
}
