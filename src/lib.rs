pub mod acquisition;
pub mod centring;
pub mod config;
pub mod consts;
pub mod error;
pub mod events;
pub mod filter;
pub mod geometry;
pub mod loader;
pub mod palette;
pub mod ranking;
pub mod requests;
pub mod results;
pub mod translator;
pub mod viewer;

pub use error::{HitMapError, HmResult};
pub use results::{ScoreGrid, ScoreKind, Shape};
pub use viewer::{HitMapViewer, ViewerState};
// cmd and reports are binary modules (see main.rs).
