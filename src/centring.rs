use crate::geometry::MotorPositions;

/// Point at `index / num_images` of the way from `start` to `end`.
/// Motors missing from `end` keep their `start` value.
pub fn point_from_line(
    start: &MotorPositions,
    end: &MotorPositions,
    index: f64,
    num_images: usize,
) -> MotorPositions {
    let fraction = if num_images == 0 {
        0.0
    } else {
        index / num_images as f64
    };

    start
        .iter()
        .map(|(motor, &p1)| {
            let p2 = end.get(motor).copied().unwrap_or(p1);
            (motor.clone(), p1 + (p2 - p1) * fraction)
        })
        .collect()
}

/// Rotation angle of a (fractional) image in an oscillation sweep.
pub fn omega_at(osc_start: f64, osc_range: f64, index: f64, num_images: usize) -> f64 {
    if num_images == 0 {
        return osc_start;
    }
    osc_start + osc_range * index / num_images as f64
}
