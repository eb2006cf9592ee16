//! Console report and feature-weight chart

use crate::artifact::FeatureSchema;
use crate::data::{Contract, CustomerInput, InternetService};
use crate::encoder::EncodedVector;
use crate::model::{Direction, FeatureWeight, Prediction, RiskLabel};
use plotters::prelude::*;

/// Bar color for weights that push towards churn
const CHURN_COLOR: RGBColor = RGBColor(231, 76, 60);
/// Bar color for weights that push towards staying
const LOYAL_COLOR: RGBColor = RGBColor(46, 204, 113);

const PROGRESS_WIDTH: usize = 40;

/// Draw every feature weight as a horizontal bar, strongest churn driver on top
///
/// # Arguments
/// * `weights` - Feature weights sorted descending (see `LogisticModel::feature_importance`)
/// * `output_path` - Path to save the PNG chart
pub fn create_importance_chart(weights: &[FeatureWeight], output_path: &str) -> crate::Result<()> {
    if weights.is_empty() {
        anyhow::bail!("no feature weights to plot");
    }

    let n = weights.len();
    let max_abs = weights
        .iter()
        .map(|w| w.weight.abs())
        .fold(0.0_f64, f64::max)
        .max(1e-6);
    let x_range = (-max_abs * 1.1)..(max_abs * 1.1);

    // Tall canvas so every feature name gets its own row
    let height = (n as u32) * 28 + 120;
    let root = BitMapBackend::new(output_path, (1000, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Feature Weights (positive = leans to churn)", ("sans-serif", 26))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(300)
        .build_cartesian_2d(x_range, 0f64..n as f64)?;

    let row_label = |y: &f64| -> String {
        let row = y.floor() as usize;
        if *y < 0.0 || row >= n {
            return String::new();
        }
        weights[n - 1 - row].feature.clone()
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&row_label)
        .x_desc("Influence (positive = more likely to churn)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(weights.iter().enumerate().map(|(i, w)| {
        let top = (n - i) as f64;
        let color = match w.direction() {
            Direction::Churn => CHURN_COLOR,
            Direction::Loyal => LOYAL_COLOR,
        };
        Rectangle::new([(0.0, top - 0.85), (w.weight, top - 0.15)], color.filled())
    }))?;

    chart.draw_series(LineSeries::new([(0.0, 0.0), (0.0, n as f64)], BLACK.stroke_width(1)))?;

    root.present()?;
    tracing::info!(path = output_path, features = n, "feature weight chart saved");

    Ok(())
}

/// One retention suggestion for customers predicted to churn
pub fn retention_advice(input: &CustomerInput, prediction: &Prediction) -> Option<&'static str> {
    if prediction.risk != RiskLabel::Churn {
        return None;
    }
    if input.contract == Contract::MonthToMonth {
        Some("Offer a long-term contract (one or two years) to lock the customer in.")
    } else if input.internet_service == InternetService::FiberOptic {
        Some("Review technical complaint history; fiber optic users are sensitive to outages.")
    } else {
        None
    }
}

/// Text progress bar for a probability in [0, 1]
pub fn progress_bar(probability: f64, width: usize) -> String {
    let filled = ((probability.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Print the risk banner, probability and any retention advice
pub fn print_prediction_report(input: &CustomerInput, prediction: &Prediction) {
    println!("=== Risk Status ===\n");
    match prediction.risk {
        RiskLabel::Churn => {
            println!("  !! {} - high-risk customer", prediction.risk);
            println!("  The model sees a pattern that leads to cancelling service.");
            println!("  Consider a retention offer right away.");
        }
        RiskLabel::Loyal => {
            println!("  OK {} - customer is safe", prediction.risk);
            println!("  The model expects this customer to stay.");
            println!("  No preventive action needed right now.");
        }
    }

    println!("\nChurn probability: {}", prediction.percent());
    println!("{}", progress_bar(prediction.probability, PROGRESS_WIDTH));

    if let Some(advice) = retention_advice(input, prediction) {
        println!("\nSuggestion: {}", advice);
    }
}

/// Print the fully encoded row, one column per line
pub fn print_encoded_vector(vector: &EncodedVector, schema: &FeatureSchema) {
    println!("\n=== Processed Input (debug) ===");
    let name_width = schema.names().iter().map(String::len).max().unwrap_or(0);
    for (name, value) in vector.named(schema) {
        println!("  {:name_width$} | {:>9.4}", name, value);
    }
}

/// Print the strongest churn and loyalty drivers
pub fn print_top_weights(weights: &[FeatureWeight], top: usize) {
    println!("\n=== Strongest Churn Drivers ===");
    for w in weights.iter().filter(|w| w.direction() == Direction::Churn).take(top) {
        println!("  {:+8.4}  {}", w.weight, w.feature);
    }

    println!("\n=== Strongest Loyalty Drivers ===");
    for w in weights.iter().rev().filter(|w| w.direction() == Direction::Loyal).take(top) {
        println!("  {:+8.4}  {}", w.weight, w.feature);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn weights() -> Vec<FeatureWeight> {
        [
            ("InternetService_Fiber optic", 0.72),
            ("PaymentMethod_Electronic check", 0.31),
            ("SeniorCitizen", 0.12),
            ("Contract_One year", -0.65),
            ("tenure", -1.24),
        ]
        .iter()
        .map(|(feature, weight)| FeatureWeight {
            feature: feature.to_string(),
            weight: *weight,
        })
        .collect()
    }

    #[test]
    fn test_create_importance_chart() {
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("weights.png");
        let output_str = output_path.to_str().unwrap();

        let result = create_importance_chart(&weights(), output_str);
        assert!(result.is_ok());
        assert!(Path::new(output_str).exists());
    }

    #[test]
    fn test_empty_chart_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("empty.png");
        assert!(create_importance_chart(&[], output_path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_retention_advice() {
        let churn = Prediction::from_probability(0.8);
        let loyal = Prediction::from_probability(0.2);

        let monthly = CustomerInput::default();
        assert!(retention_advice(&monthly, &churn).unwrap().contains("long-term contract"));
        assert_eq!(retention_advice(&monthly, &loyal), None);

        let fiber = CustomerInput {
            contract: Contract::OneYear,
            internet_service: InternetService::FiberOptic,
            ..CustomerInput::default()
        };
        assert!(retention_advice(&fiber, &churn).unwrap().contains("fiber optic"));

        let dsl_yearly = CustomerInput {
            contract: Contract::TwoYear,
            ..CustomerInput::default()
        };
        assert_eq!(retention_advice(&dsl_yearly, &churn), None);
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "[----]");
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(1.0, 4), "[####]");
        assert_eq!(progress_bar(1.7, 4), "[####]");
    }
}
