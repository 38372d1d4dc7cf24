//! Field selection for a registration run.
//!
//! A run aligns several fields at once. Each selected field occupies one frame of the
//! correlation vector, in the order it is listed. The selection is written in YAML:
//!
//! ```yaml
//! fields:
//!   - field: sulc
//!   - field: amygdala_dist
//!     weight: 0.5
//!     averages: 4
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use corrframe_registry::{FieldClass, FieldCode, FieldName};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("selection lists no fields")]
    Empty,
    #[error("field {field} is selected more than once")]
    DuplicateField { field: FieldCode },
    #[error("field {field} has invalid weight {weight}")]
    InvalidWeight { field: FieldCode, weight: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSelection {
    pub fields: Vec<SelectedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectedField {
    /// Code, symbolic key or canonical name.
    pub field: FieldCode,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Smoothing iterations applied to the field before correlation.
    #[serde(default)]
    pub averages: u32,
}

fn default_weight() -> f64 {
    1.0
}

impl SelectedField {
    pub fn new(field: FieldCode) -> Self {
        Self {
            field,
            weight: default_weight(),
            averages: 0,
        }
    }
}

impl FieldSelection {
    pub fn parse_yaml(yaml: &str) -> Result<Self, SelectionError> {
        let selection: Self = serde_yaml::from_str(yaml)?;
        selection.validate()?;
        Ok(selection)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SelectionError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SelectionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let selection = Self::parse_yaml(&text)?;
        tracing::info!(
            path = %path.display(),
            fields = selection.fields.len(),
            "loaded field selection"
        );
        Ok(selection)
    }

    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.fields.is_empty() {
            return Err(SelectionError::Empty);
        }
        let mut seen = HashSet::new();
        for selected in &self.fields {
            if !seen.insert(selected.field) {
                return Err(SelectionError::DuplicateField {
                    field: selected.field,
                });
            }
            if !selected.weight.is_finite() || selected.weight < 0.0 {
                return Err(SelectionError::InvalidWeight {
                    field: selected.field,
                    weight: selected.weight,
                });
            }
        }
        Ok(())
    }

    /// Assign frames in listing order and resolve where each field comes from.
    /// The selection is validated first, since `fields` may have been edited directly.
    pub fn plan(&self) -> Result<LoadPlan, SelectionError> {
        self.validate()?;
        let frames = self
            .fields
            .iter()
            .enumerate()
            .map(|(frame, selected)| {
                let entry = FrameEntry::new(frame, selected);
                tracing::debug!(
                    frame,
                    field = %entry.field,
                    distance = entry.distance,
                    "planned frame"
                );
                entry
            })
            .collect();
        Ok(LoadPlan { frames })
    }
}

/// Where a frame's values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum FieldSource {
    LoadByName(&'static str),
    Computed,
}

impl From<FieldName> for FieldSource {
    fn from(name: FieldName) -> Self {
        match name {
            FieldName::Named(name) => FieldSource::LoadByName(name),
            FieldName::DirectlyComputed => FieldSource::Computed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameEntry {
    pub frame: usize,
    pub field: FieldCode,
    pub class: FieldClass,
    pub source: FieldSource,
    pub distance: bool,
    pub weight: f64,
    pub averages: u32,
}

impl FrameEntry {
    fn new(frame: usize, selected: &SelectedField) -> Self {
        let field = selected.field;
        Self {
            frame,
            field,
            class: field.class(),
            source: field.name().into(),
            distance: field.is_distance_field(),
            weight: selected.weight,
            averages: selected.averages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadPlan {
    pub frames: Vec<FrameEntry>,
}

impl LoadPlan {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameEntry> + '_ {
        self.frames.iter()
    }

    pub fn distance_frames(&self) -> impl Iterator<Item = &FrameEntry> + '_ {
        self.frames.iter().filter(|entry| entry.distance)
    }

    /// Names that must be read from disk, in frame order.
    pub fn named_sources(&self) -> Vec<&'static str> {
        self.frames
            .iter()
            .filter_map(|entry| match entry.source {
                FieldSource::LoadByName(name) => Some(name),
                FieldSource::Computed => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MIXED: &str = r#"fields:
  - field: curvature
  - field: sulc
    averages: 2
  - field: 9
    weight: 0.5
  - field: T1mid
"#;

    #[test]
    fn parses_codes_keys_and_names() {
        let selection = FieldSelection::parse_yaml(MIXED).expect("selection should parse");
        let fields: Vec<FieldCode> = selection.fields.iter().map(|s| s.field).collect();
        assert_eq!(
            fields,
            vec![
                FieldCode::Curvature,
                FieldCode::Sulc,
                FieldCode::Pallidum,
                FieldCode::T1Mid
            ]
        );
        assert_eq!(selection.fields[0].weight, 1.0);
        assert_eq!(selection.fields[0].averages, 0);
        assert_eq!(selection.fields[1].averages, 2);
        assert_eq!(selection.fields[2].weight, 0.5);
    }

    #[test]
    fn plan_assigns_frames_in_order() {
        let plan = FieldSelection::parse_yaml(MIXED).unwrap().plan().unwrap();
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.frames[0].source, FieldSource::Computed);
        assert_eq!(plan.frames[0].class, FieldClass::DirectlyComputed);
        assert_eq!(plan.frames[2].frame, 2);
        assert_eq!(plan.frames[2].source, FieldSource::LoadByName("pallidum_dist"));
        assert!(plan.frames[2].distance);
        assert_eq!(plan.named_sources(), vec!["sulc", "pallidum_dist", "T1mid"]);

        let distance: Vec<usize> = plan.distance_frames().map(|e| e.frame).collect();
        assert_eq!(distance, vec![2]);
    }

    #[test]
    fn rejects_empty_selection() {
        let err = FieldSelection::parse_yaml("fields: []\n").unwrap_err();
        assert!(matches!(err, SelectionError::Empty));
    }

    #[test]
    fn rejects_same_field_by_code_and_name() {
        let yaml = "fields:\n  - field: 1\n  - field: sulc\n";
        let err = FieldSelection::parse_yaml(yaml).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::DuplicateField {
                field: FieldCode::Sulc
            }
        ));
    }

    #[test]
    fn rejects_bad_weights() {
        let negative = "fields:\n  - field: caudate\n    weight: -0.1\n";
        assert!(matches!(
            FieldSelection::parse_yaml(negative).unwrap_err(),
            SelectionError::InvalidWeight { .. }
        ));

        let nan = "fields:\n  - field: caudate\n    weight: .nan\n";
        assert!(matches!(
            FieldSelection::parse_yaml(nan).unwrap_err(),
            SelectionError::InvalidWeight { .. }
        ));
    }

    #[test]
    fn rejects_out_of_range_code() {
        let err = FieldSelection::parse_yaml("fields:\n  - field: 14\n").unwrap_err();
        assert!(matches!(err, SelectionError::Yaml(_)));
        assert!(err.to_string().contains("invalid field code 14"));
    }

    #[test]
    fn rejects_unknown_field_name() {
        let err = FieldSelection::parse_yaml("fields:\n  - field: thalamus_dist\n").unwrap_err();
        assert!(err.to_string().contains("unknown field: thalamus_dist"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let yaml = "fields:\n  - field: sulc\n    wieght: 2.0\n";
        assert!(matches!(
            FieldSelection::parse_yaml(yaml).unwrap_err(),
            SelectionError::Yaml(_)
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MIXED.as_bytes()).unwrap();
        let selection = FieldSelection::from_path(file.path()).unwrap();
        assert_eq!(selection.fields.len(), 4);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.yaml");
        let err = FieldSelection::from_path(&path).unwrap_err();
        match err {
            SelectionError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn example_config_is_valid() {
        let yaml = include_str!("../../config/fields.example.yaml");
        let plan = FieldSelection::parse_yaml(yaml).unwrap().plan().unwrap();
        assert_eq!(plan.len(), 5);
        assert_eq!(plan.distance_frames().count(), 2);
        assert_eq!(
            plan.named_sources(),
            vec!["sulc", "amygdala_dist", "hippocampus_dist"]
        );
    }

    #[test]
    fn validate_accepts_programmatic_selection() {
        let selection = FieldSelection {
            fields: vec![
                SelectedField::new(FieldCode::InflatedCurvature),
                SelectedField::new(FieldCode::InfLatVentricle),
            ],
        };
        selection.validate().unwrap();
        assert_eq!(
            selection.plan().unwrap().named_sources(),
            vec!["inflatventricle_dist"]
        );
    }

    #[test]
    fn plan_refuses_unvalidated_duplicates() {
        let mut selection = FieldSelection::parse_yaml("fields:\n  - field: putamen\n").unwrap();
        selection.fields.push(SelectedField::new(FieldCode::Putamen));
        assert!(matches!(
            selection.plan().unwrap_err(),
            SelectionError::DuplicateField {
                field: FieldCode::Putamen
            }
        ));

        selection.fields.clear();
        assert!(matches!(selection.plan().unwrap_err(), SelectionError::Empty));
    }
}
