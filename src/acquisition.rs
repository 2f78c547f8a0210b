use crate::geometry::{GridGeometry, MeshGrid, MotorPositions};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct AcquisitionParameters {
    pub num_images: usize,
    #[builder(default = 1)]
    #[serde(default = "default_first_image")]
    pub first_image: usize,
    #[builder(default)]
    #[serde(default)]
    pub osc_start: f64,
    #[builder(default)]
    #[serde(default)]
    pub osc_range: f64,
}

fn default_first_image() -> usize {
    1
}

fn default_precision() -> usize {
    4
}

fn default_suffix() -> String {
    "cbf".to_string()
}

/// `{directory}/{prefix}_{run}_{image_num:0precision}.{suffix}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTemplate {
    pub directory: String,
    pub base_prefix: String,
    #[serde(default = "default_first_image")]
    pub run_number: usize,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl PathTemplate {
    pub fn image_path(&self, image_num: usize) -> String {
        let directory = self.directory.trim_end_matches('/');
        format!(
            "{}/{}_{}_{:0width$}.{}",
            directory,
            self.base_prefix,
            self.run_number,
            image_num,
            self.suffix,
            width = self.precision
        )
    }
}

/// Replaces a leading path prefix, used when the image tracker sees the
/// data under a different mount point than the detector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathRewrite {
    pub from: String,
    pub to: String,
}

impl PathRewrite {
    /// Parses `from=to`; an empty string disables rewriting.
    pub fn parse(spec: &str) -> Option<Self> {
        let (from, to) = spec.split_once('=')?;
        let from = from.trim();
        if from.is_empty() {
            return None;
        }
        Some(Self {
            from: from.to_string(),
            to: to.trim().to_string(),
        })
    }

    pub fn apply(&self, path: &str) -> String {
        match path.strip_prefix(&self.from) {
            Some(rest) => format!("{}{}", self.to, rest),
            None => path.to_string(),
        }
    }
}

pub enum ScanLayout {
    Mesh(Rc<dyn GridGeometry>),
    /// Line or oscillation scan between two centred positions.
    Line {
        start: MotorPositions,
        end: MotorPositions,
    },
}

/// One data collection as seen by the viewer. Owned by the caller; the
/// viewer only keeps weak references to it and to its grid.
pub struct DataCollection {
    pub name: String,
    pub parameters: AcquisitionParameters,
    pub path_template: PathTemplate,
    pub layout: ScanLayout,
    pub collected: bool,
}

impl DataCollection {
    pub fn mesh(
        name: &str,
        parameters: AcquisitionParameters,
        path_template: PathTemplate,
        grid: MeshGrid,
    ) -> Self {
        Self {
            name: name.to_string(),
            parameters,
            path_template,
            layout: ScanLayout::Mesh(Rc::new(grid)),
            collected: false,
        }
    }

    pub fn line(
        name: &str,
        parameters: AcquisitionParameters,
        path_template: PathTemplate,
        start: MotorPositions,
        end: MotorPositions,
    ) -> Self {
        Self {
            name: name.to_string(),
            parameters,
            path_template,
            layout: ScanLayout::Line { start, end },
            collected: false,
        }
    }

    pub fn with_collected(mut self, collected: bool) -> Self {
        self.collected = collected;
        self
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.layout, ScanLayout::Mesh(_))
    }

    pub fn grid(&self) -> Option<&Rc<dyn GridGeometry>> {
        match &self.layout {
            ScanLayout::Mesh(grid) => Some(grid),
            ScanLayout::Line { .. } => None,
        }
    }

    pub fn centred_positions(&self) -> Option<(&MotorPositions, &MotorPositions)> {
        match &self.layout {
            ScanLayout::Line { start, end } => Some((start, end)),
            ScanLayout::Mesh(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_path_is_zero_padded() {
        let template = PathTemplate {
            directory: "/data/visitor/mx1234/".to_string(),
            base_prefix: "mesh".to_string(),
            run_number: 2,
            suffix: "h5".to_string(),
            precision: 5,
        };
        assert_eq!(template.image_path(17), "/data/visitor/mx1234/mesh_2_00017.h5");
    }

    #[test]
    fn test_path_rewrite() {
        let rw = PathRewrite::parse("/mnt/beegfs=/ramdisk/beegfs").unwrap();
        assert_eq!(rw.apply("/mnt/beegfs/P13/a.cbf"), "/ramdisk/beegfs/P13/a.cbf");
        assert_eq!(rw.apply("/data/a.cbf"), "/data/a.cbf");
        assert!(PathRewrite::parse("").is_none());
    }

    #[test]
    fn test_parameters_builder_defaults() {
        let p = AcquisitionParameters::builder().num_images(100).build();
        assert_eq!(p.first_image, 1);
        assert_eq!(p.osc_range, 0.0);
    }
}
