//! churnscope: customer churn scoring against a pre-trained classifier
//!
//! Customer form values are encoded into the exact column layout the
//! classifier was trained on, scaled with the training-time statistics and
//! scored into a churn probability and risk label.

pub mod artifact;
pub mod cli;
pub mod data;
pub mod encoder;
pub mod error;
pub mod model;
pub mod viz;

// Re-export public items for easier access
pub use artifact::{load_cached, ArtifactBundle, FeatureSchema, StandardScaler};
pub use cli::Args;
pub use data::CustomerInput;
pub use encoder::{encode, EncodedVector, FeatureEncoder};
pub use error::{EncodeError, InputError, LoadError, PredictError};
pub use model::{classify, predict, LogisticModel, Prediction, RiskLabel};
pub use viz::create_importance_chart;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
