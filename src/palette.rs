use crate::viewer::ViewerState;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const STATE_COLORS: [(ViewerState, Rgb); 3] = [
    (ViewerState::Empty, Rgb(160, 160, 160)),
    (ViewerState::Live, Rgb(255, 190, 0)),
    (ViewerState::Final, Rgb(40, 180, 70)),
];

// Dark blue -> teal -> green -> yellow, low to high intensity.
const INTENSITY_RAMP: [Rgb; 5] = [
    Rgb(68, 1, 84),
    Rgb(59, 82, 139),
    Rgb(33, 145, 140),
    Rgb(94, 201, 98),
    Rgb(253, 231, 37),
];

const HIDDEN_CELL: Rgb = Rgb(30, 30, 30);

/// Read-only color table shared by every view.
#[derive(Debug)]
pub struct Palette {
    states: Vec<(ViewerState, Rgb)>,
    ramp: Vec<Rgb>,
    hidden: Rgb,
}

static PALETTE: OnceLock<Palette> = OnceLock::new();

impl Palette {
    pub fn new(states: Vec<(ViewerState, Rgb)>, ramp: Vec<Rgb>, hidden: Rgb) -> Self {
        Self {
            states,
            ramp,
            hidden,
        }
    }

    fn build() -> Self {
        Self::new(STATE_COLORS.to_vec(), INTENSITY_RAMP.to_vec(), HIDDEN_CELL)
    }

    pub fn global() -> &'static Palette {
        PALETTE.get_or_init(Self::build)
    }

    pub fn state(&self, state: ViewerState) -> Rgb {
        self.states
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, c)| *c)
            .unwrap_or(self.hidden)
    }

    /// `fraction` of the maximum displayed value; zero cells are hidden.
    pub fn intensity(&self, fraction: f32) -> Rgb {
        if fraction.is_nan() || fraction <= 0.0 {
            return self.hidden;
        }
        let Some(last) = self.ramp.len().checked_sub(1) else {
            return self.hidden;
        };
        let idx = ((fraction.min(1.0) * last as f32).round() as usize).min(last);
        self.ramp[idx]
    }
}
