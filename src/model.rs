//! Logistic-regression classifier, churn prediction and feature weights

use crate::artifact::FeatureSchema;
use crate::encoder::EncodedVector;
use crate::error::PredictError;
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probabilities strictly above this are labelled churn
pub const CHURN_THRESHOLD: f64 = 0.5;

/// Class index of "churn" in the classifier's probability output
pub const CHURN_CLASS: usize = 1;

/// Fitted binary logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// One weight per schema column, same order
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Self {
        Self { coef, intercept }
    }

    pub fn n_features(&self) -> usize {
        self.coef.len()
    }

    /// Class probabilities for each row: column 0 loyal, column 1 churn
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, PredictError> {
        if x.ncols() != self.n_features() {
            return Err(PredictError::ShapeMismatch {
                expected: self.n_features(),
                actual: x.ncols(),
            });
        }

        let weights = ArrayView1::from(self.coef.as_slice());
        let churn = (x.dot(&weights) + self.intercept).mapv(sigmoid);

        let mut proba = Array2::zeros((x.nrows(), 2));
        proba.column_mut(CHURN_CLASS).assign(&churn);
        proba.column_mut(1 - CHURN_CLASS).assign(&churn.mapv(|p| 1.0 - p));
        Ok(proba)
    }

    /// Coefficients paired with their column names, most churn-inclining first
    pub fn feature_importance(&self, schema: &FeatureSchema) -> Vec<FeatureWeight> {
        let mut weights: Vec<FeatureWeight> = schema
            .names()
            .iter()
            .zip(&self.coef)
            .map(|(name, &weight)| FeatureWeight {
                feature: name.clone(),
                weight,
            })
            .collect();
        weights.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        weights
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Binary risk classification of a churn probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    Churn,
    Loyal,
}

impl RiskLabel {
    pub fn from_probability(probability: f64) -> Self {
        if probability > CHURN_THRESHOLD {
            RiskLabel::Churn
        } else {
            RiskLabel::Loyal
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::Churn => f.write_str("CHURN"),
            RiskLabel::Loyal => f.write_str("LOYAL"),
        }
    }
}

/// Outcome of scoring one customer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub risk: RiskLabel,
}

impl Prediction {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            probability,
            risk: RiskLabel::from_probability(probability),
        }
    }

    /// Probability as a percentage with two decimals, e.g. `73.12%`
    pub fn percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

/// Which way a coefficient pushes the prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Churn,
    Loyal,
}

/// One schema column and its classifier weight
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureWeight {
    pub feature: String,
    pub weight: f64,
}

impl FeatureWeight {
    pub fn direction(&self) -> Direction {
        if self.weight > 0.0 {
            Direction::Churn
        } else {
            Direction::Loyal
        }
    }
}

/// Churn probability for a single encoded customer
pub fn predict(classifier: &LogisticModel, vector: &EncodedVector) -> Result<f64, PredictError> {
    let row = vector.values().view().insert_axis(Axis(0)).to_owned();
    let proba = classifier.predict_proba(&row)?;
    Ok(proba[[0, CHURN_CLASS]])
}

/// Score and classify in one step
pub fn classify(classifier: &LogisticModel, vector: &EncodedVector) -> Result<Prediction, PredictError> {
    let probability = predict(classifier, vector)?;
    tracing::debug!(probability, "scored customer");
    Ok(Prediction::from_probability(probability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn schema(names: &[&str]) -> FeatureSchema {
        FeatureSchema::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let model = LogisticModel::new(vec![1.0, -2.0], 0.5);
        let x = array![[0.0, 0.0], [1.0, 1.0], [3.0, -1.0]];
        let proba = model.predict_proba(&x).unwrap();

        assert_eq!(proba.shape(), &[3, 2]);
        for row in proba.outer_iter() {
            assert!((row[0] + row[1] - 1.0).abs() < 1e-12);
        }
        // z = 0.5 for the first row
        assert!((proba[[0, CHURN_CLASS]] - sigmoid(0.5)).abs() < 1e-12);
        assert!(proba[[2, CHURN_CLASS]] > 0.99);
    }

    #[test]
    fn test_predict_proba_shape_mismatch() {
        let model = LogisticModel::new(vec![1.0, 2.0, 3.0], 0.0);
        let x = array![[1.0, 2.0]];
        assert_eq!(
            model.predict_proba(&x),
            Err(PredictError::ShapeMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(RiskLabel::from_probability(0.5), RiskLabel::Loyal);
        assert_eq!(RiskLabel::from_probability(0.50000001), RiskLabel::Churn);
        assert_eq!(RiskLabel::from_probability(0.0), RiskLabel::Loyal);
        assert_eq!(RiskLabel::from_probability(1.0), RiskLabel::Churn);
    }

    #[test]
    fn test_prediction_percent() {
        let prediction = Prediction::from_probability(0.731234);
        assert_eq!(prediction.percent(), "73.12%");
        assert_eq!(prediction.risk, RiskLabel::Churn);
        assert_eq!(prediction.risk.to_string(), "CHURN");
    }

    #[test]
    fn test_feature_importance_sorted_and_paired() {
        let schema = schema(&["tenure", "Contract_Two year", "InternetService_Fiber optic"]);
        let model = LogisticModel::new(vec![-1.3, -0.9, 0.7], 0.0);

        let weights = model.feature_importance(&schema);
        let names: Vec<&str> = weights.iter().map(|w| w.feature.as_str()).collect();
        assert_eq!(names, ["InternetService_Fiber optic", "Contract_Two year", "tenure"]);
        assert_eq!(weights[0].direction(), Direction::Churn);
        assert_eq!(weights[2].direction(), Direction::Loyal);
    }
}
