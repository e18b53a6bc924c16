//! Fixture model bundles for DiagHer tests.
//!
//! The forest fixture is small enough to evaluate by hand. Features are
//! scaled so that a present symptom (1) maps to +1 and an absent one (0)
//! to -1; every split uses threshold 0.
//!
//! Tree 1: chest_pain? → shortness_of_breath? : pelvic_pain?
//! Tree 2: dizziness?  → gender (Female right)  : flat leaf
//!
//! Class order: Endometriosis, Heart Disease, Migraine, Panic Disorder.

use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;

pub const MODEL_FILE: &str = "diagnosis_model.json";
pub const SCALER_FILE: &str = "diagnosis_scaler.json";
pub const ENCODER_FILE: &str = "diagnosis_encoder.json";
pub const FEATURES_FILE: &str = "diagnosis_features.json";
pub const METADATA_FILE: &str = "diagnosis_metadata.json";

pub const FEATURES: [&str; 10] = [
    "age",
    "gender",
    "chest_pain",
    "shortness_of_breath",
    "fatigue",
    "nausea",
    "jaw_pain",
    "dizziness",
    "pelvic_pain",
    "irregular_periods",
];

pub const CLASSES: [&str; 4] = ["Endometriosis", "Heart Disease", "Migraine", "Panic Disorder"];

pub const TRAINED_DATE: &str = "2024-05-01T12:00:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureModel {
    Forest,
    Logistic,
}

/// Builder for an on-disk model bundle.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    model: FixtureModel,
    skipped: Vec<&'static str>,
    metadata: bool,
    corrupt: Vec<&'static str>,
}

impl ModelBundle {
    pub fn forest() -> Self {
        Self { model: FixtureModel::Forest, skipped: Vec::new(), metadata: true, corrupt: Vec::new() }
    }

    pub fn logistic() -> Self {
        Self { model: FixtureModel::Logistic, ..Self::forest() }
    }

    /// Leave one artifact file out of the bundle.
    pub fn without(mut self, file: &'static str) -> Self {
        self.skipped.push(file);
        self
    }

    pub fn without_metadata(mut self) -> Self {
        self.metadata = false;
        self
    }

    /// Write garbage instead of JSON for one artifact.
    pub fn corrupted(mut self, file: &'static str) -> Self {
        self.corrupt.push(file);
        self
    }

    pub fn write_to(&self, dir: &Path) -> anyhow::Result<()> {
        let model = match self.model {
            FixtureModel::Forest => forest_model_json(),
            FixtureModel::Logistic => logistic_model_json(),
        };

        let mut files = vec![
            (MODEL_FILE, model),
            (SCALER_FILE, scaler_json()),
            (ENCODER_FILE, encoder_json()),
            (FEATURES_FILE, features_json()),
        ];
        if self.metadata {
            files.push((METADATA_FILE, metadata_json()));
        }

        for (name, value) in files {
            if self.skipped.contains(&name) {
                continue;
            }
            let path = dir.join(name);
            if self.corrupt.contains(&name) {
                std::fs::write(&path, "{ not json")?;
            } else {
                std::fs::write(&path, serde_json::to_string_pretty(&value)?)?;
            }
        }
        Ok(())
    }

    /// Write the bundle into a fresh temporary directory.
    pub fn into_temp_dir(self) -> anyhow::Result<TempDir> {
        let dir = tempfile::tempdir()?;
        self.write_to(dir.path())?;
        Ok(dir)
    }
}

pub fn features_json() -> Value {
    json!(FEATURES)
}

pub fn encoder_json() -> Value {
    json!({ "classes": CLASSES })
}

/// age ~ N(40, 15); binary features centred on 0.5 with scale 0.5.
pub fn scaler_json() -> Value {
    let mut mean = vec![40.0];
    let mut scale = vec![15.0];
    mean.extend(std::iter::repeat(0.5).take(FEATURES.len() - 1));
    scale.extend(std::iter::repeat(0.5).take(FEATURES.len() - 1));
    json!({ "mean": mean, "scale": scale })
}

pub fn metadata_json() -> Value {
    json!({
        "trained_date": TRAINED_DATE,
        "feature_count": FEATURES.len(),
        "class_count": CLASSES.len(),
        "classes": CLASSES,
    })
}

pub fn forest_model_json() -> Value {
    json!({
        "kind": "random_forest",
        "n_features": FEATURES.len(),
        "n_classes": CLASSES.len(),
        "trees": [
            {
                "children_left":  [1, 2, -1, -1, 5, -1, -1],
                "children_right": [4, 3, -1, -1, 6, -1, -1],
                "feature":        [2, 8, -2, -2, 3, -2, -2],
                "threshold":      [0.0, 0.0, -2.0, -2.0, 0.0, -2.0, -2.0],
                "value": [
                    [9.0, 11.0, 12.0, 8.0],
                    [9.0, 2.0, 6.0, 3.0],
                    [1.0, 2.0, 5.0, 2.0],
                    [8.0, 0.0, 1.0, 1.0],
                    [0.0, 10.0, 1.0, 9.0],
                    [0.0, 3.0, 1.0, 6.0],
                    [0.0, 7.0, 0.0, 3.0]
                ]
            },
            {
                "children_left":  [1, -1, 3, -1, -1],
                "children_right": [2, -1, 4, -1, -1],
                "feature":        [7, -2, 1, -2, -2],
                "threshold":      [0.0, -2.0, 0.0, -2.0, -2.0],
                "value": [
                    [2.0, 14.0, 6.0, 8.0],
                    [2.0, 3.0, 2.0, 3.0],
                    [0.0, 11.0, 3.0, 6.0],
                    [0.0, 6.0, 2.0, 2.0],
                    [0.0, 5.0, 1.0, 4.0]
                ]
            }
        ],
        "feature_importances": [0.05, 0.10, 0.30, 0.15, 0.02, 0.02, 0.005, 0.20, 0.15, 0.005]
    })
}

/// Multinomial logistic model; one driving symptom per class.
pub fn logistic_model_json() -> Value {
    let mut coef = vec![vec![0.0; FEATURES.len()]; CLASSES.len()];
    coef[0][8] = 2.0; // Endometriosis ← pelvic_pain
    coef[1][2] = 2.0; // Heart Disease ← chest_pain
    coef[2][7] = 1.0; // Migraine ← dizziness
    coef[3][3] = 1.0; // Panic Disorder ← shortness_of_breath
    json!({
        "kind": "logistic_regression",
        "coef": coef,
        "intercept": [0.0, 0.0, 0.0, 0.0],
        "multi_class": "multinomial"
    })
}

/// The cardiac presentation used across the test suites.
pub fn cardiac_request_json() -> Value {
    json!({
        "age": 45,
        "gender": "Female",
        "symptoms": {
            "chest_pain": 1,
            "shortness_of_breath": 1,
            "fatigue": 1,
            "nausea": 1,
            "jaw_pain": 0,
            "dizziness": 1
        }
    })
}

/// Pelvic presentation that favours Endometriosis under the forest fixture.
pub fn pelvic_request_json() -> Value {
    json!({
        "age": 29,
        "gender": "Female",
        "symptoms": {
            "pelvic_pain": 1,
            "irregular_periods": 1,
            "fatigue": 1
        }
    })
}
