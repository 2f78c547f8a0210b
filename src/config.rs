use crate::acquisition::PathRewrite;
use crate::consts::{DEFAULT_BEST_POSITIONS, DEFAULT_OMEGA_MOTOR};
use crate::error::{HitMapError, HmResult};
use crate::results::{MergePolicy, ScoreKind};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub viewer: ViewerParams,
}

#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerParams {
    // === KIND SELECTION (first results only) ===
    #[arg(long, default_value_t = ScoreKind::Score)]
    pub mesh_score_kind: ScoreKind,
    #[arg(long, default_value_t = ScoreKind::Resolution)]
    pub line_score_kind: ScoreKind,

    // === RESULTS ===
    #[arg(long, default_value_t = MergePolicy::RejectStale)]
    pub merge_policy: MergePolicy,
    #[arg(long, default_value_t = DEFAULT_BEST_POSITIONS)]
    pub best_positions_limit: usize,

    // === IMAGES ===
    #[arg(long, default_value_t = false)]
    pub continuous_image_display: bool,
    /// `from=to` prefix substitution applied before images are displayed.
    #[arg(long, default_value = "")]
    pub image_path_rewrite: String,

    // === MOTORS ===
    #[arg(long, default_value = DEFAULT_OMEGA_MOTOR)]
    pub omega_motor: String,
    #[arg(long, default_value_t = 90.0)]
    pub helical_rotation_deg: f64,
}

impl Default for ViewerParams {
    fn default() -> Self {
        Self {
            mesh_score_kind: ScoreKind::Score,
            line_score_kind: ScoreKind::Resolution,
            merge_policy: MergePolicy::RejectStale,
            best_positions_limit: DEFAULT_BEST_POSITIONS,
            continuous_image_display: false,
            image_path_rewrite: String::new(),
            omega_motor: DEFAULT_OMEGA_MOTOR.to_string(),
            helical_rotation_deg: 90.0,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> HmResult<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            HitMapError::Config(format!(
                "Failed to read config '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.viewer.validate()?;
        Ok(config)
    }
}

impl ViewerParams {
    pub fn validate(&self) -> HmResult<()> {
        if !self.image_path_rewrite.is_empty() && self.path_rewrite().is_none() {
            return Err(HitMapError::Config(format!(
                "image_path_rewrite '{}' is not of the form from=to",
                self.image_path_rewrite
            )));
        }
        if self.omega_motor.trim().is_empty() {
            return Err(HitMapError::Config("omega_motor must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn path_rewrite(&self) -> Option<PathRewrite> {
        PathRewrite::parse(&self.image_path_rewrite)
    }

    pub fn default_kind(&self, is_mesh: bool) -> ScoreKind {
        if is_mesh {
            self.mesh_score_kind
        } else {
            self.line_score_kind
        }
    }

    /// Copies every value the user typed on the command line over the
    /// values loaded from file.
    pub fn merge_from_cli(&mut self, cli: &ViewerParams, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(mesh_score_kind, "mesh_score_kind");
        update_if_present!(line_score_kind, "line_score_kind");
        update_if_present!(merge_policy, "merge_policy");
        update_if_present!(best_positions_limit, "best_positions_limit");
        update_if_present!(continuous_image_display, "continuous_image_display");
        update_if_present!(image_path_rewrite, "image_path_rewrite");
        update_if_present!(omega_motor, "omega_motor");
        update_if_present!(helical_rotation_deg, "helical_rotation_deg");
    }
}
