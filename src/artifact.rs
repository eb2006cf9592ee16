//! Loading the pre-trained model bundle: classifier, scaler and feature schema
//!
//! The bundle is a single JSON document produced offline from the training
//! run. It is read once per process and shared read-only afterwards.

use crate::error::LoadError;
use crate::model::LogisticModel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Default bundle location, relative to the working directory
pub const DEFAULT_ARTIFACT_PATH: &str = "churn_prediction_bestmodel.json";

/// Numeric columns in the order the scaler was fitted on
pub const NUMERIC_FEATURES: [&str; 3] = ["tenure", "MonthlyCharges", "TotalCharges"];

static BUNDLE: OnceLock<ArtifactBundle> = OnceLock::new();

/// Ordered column names the classifier expects
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Result<Self, LoadError> {
        if names.is_empty() {
            return Err(LoadError::Invalid("feature list is empty".into()));
        }

        let mut index = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(LoadError::Invalid(format!("duplicate feature name `{name}`")));
            }
        }

        Ok(Self { names, index })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column position of `name`, if the classifier was trained with it
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Standardization fitted on the training set: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; 3],
    pub scale: [f64; 3],
    /// Column names seen at fit time, when the exporter recorded them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names_in: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn new(mean: [f64; 3], scale: [f64; 3]) -> Self {
        Self {
            mean,
            scale,
            feature_names_in: None,
        }
    }

    /// Scale one `(tenure, monthly, total)` triple with the training statistics
    pub fn transform(&self, raw: [f64; 3]) -> [f64; 3] {
        let mut scaled = [0.0; 3];
        for (i, value) in raw.iter().enumerate() {
            scaled[i] = (value - self.mean[i]) / self.scale[i];
        }
        scaled
    }

    /// Training-set means keyed by numeric column name
    pub fn training_means(&self) -> Vec<(&'static str, f64)> {
        NUMERIC_FEATURES.iter().copied().zip(self.mean).collect()
    }

    fn validate(&self) -> Result<(), LoadError> {
        if let Some(names) = &self.feature_names_in {
            if names.iter().map(String::as_str).ne(NUMERIC_FEATURES) {
                return Err(LoadError::Invalid(format!(
                    "scaler was fitted on {names:?}, expected {NUMERIC_FEATURES:?}"
                )));
            }
        }

        for (name, (mean, scale)) in NUMERIC_FEATURES.iter().zip(self.mean.iter().zip(self.scale)) {
            if !mean.is_finite() {
                return Err(LoadError::Invalid(format!("scaler mean for {name} is not finite")));
            }
            if !scale.is_finite() || scale == 0.0 {
                return Err(LoadError::Invalid(format!(
                    "scaler scale for {name} must be finite and non-zero, got {scale}"
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RawBundle {
    model: LogisticModel,
    scaler: StandardScaler,
    features: Vec<String>,
}

/// Everything the scorer needs from training, validated against itself
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub classifier: LogisticModel,
    pub scaler: StandardScaler,
    pub schema: FeatureSchema,
}

impl ArtifactBundle {
    /// Assemble a bundle, checking that classifier, scaler and schema agree
    pub fn from_parts(
        classifier: LogisticModel,
        scaler: StandardScaler,
        features: Vec<String>,
    ) -> Result<Self, LoadError> {
        let schema = FeatureSchema::new(features)?;

        if classifier.n_features() != schema.len() {
            return Err(LoadError::Invalid(format!(
                "classifier has {} coefficients but the schema lists {} features",
                classifier.n_features(),
                schema.len()
            )));
        }
        if !classifier.intercept.is_finite() || classifier.coef.iter().any(|w| !w.is_finite()) {
            return Err(LoadError::Invalid("classifier weights must be finite".into()));
        }
        scaler.validate()?;

        Ok(Self {
            classifier,
            scaler,
            schema,
        })
    }

    /// Read and validate the bundle at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();

        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawBundle = serde_json::from_str(&text).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let bundle = Self::from_parts(raw.model, raw.scaler, raw.features)?;
        tracing::info!(
            path = %path.display(),
            features = bundle.schema.len(),
            "loaded model artifact"
        );
        Ok(bundle)
    }
}

/// Load the bundle once for the whole process and hand out shared references
///
/// After the first success every call returns that bundle, whatever `path`
/// says. A failed load caches nothing.
pub fn load_cached(path: impl AsRef<Path>) -> Result<&'static ArtifactBundle, LoadError> {
    if let Some(bundle) = BUNDLE.get() {
        return Ok(bundle);
    }
    let bundle = ArtifactBundle::load(path)?;
    Ok(BUNDLE.get_or_init(|| bundle))
}

/// The cached bundle, if `load_cached` has succeeded
pub fn cached() -> Option<&'static ArtifactBundle> {
    BUNDLE.get()
}
