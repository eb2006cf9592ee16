//! Command-line interface: the customer form and output options

use crate::artifact::DEFAULT_ARTIFACT_PATH;
use crate::data::{
    AddOn, AddOns, Contract, CustomerInput, Gender, InternetService, MultipleLines, PaymentMethod,
    YesNo,
};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

/// Predict whether a telecom customer will churn using a pre-trained classifier
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the model artifact bundle (JSON)
    #[arg(short, long, default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,

    /// Read the whole customer form from a JSON file instead of the flags below
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    #[arg(long, default_value = "Male")]
    pub gender: Gender,

    #[arg(long, default_value = "No")]
    pub senior_citizen: YesNo,

    #[arg(long, default_value = "No")]
    pub partner: YesNo,

    #[arg(long, default_value = "No")]
    pub dependents: YesNo,

    /// Tenure in months (0-72)
    #[arg(long, default_value = "12")]
    pub tenure: u32,

    #[arg(long, default_value = "No")]
    pub phone_service: YesNo,

    /// Defaults to the first option offered for the chosen phone service
    #[arg(long)]
    pub multiple_lines: Option<MultipleLines>,

    #[arg(long, default_value = "DSL")]
    pub internet_service: InternetService,

    /// Add-ons default to the first option offered for the chosen internet service
    #[arg(long)]
    pub online_security: Option<AddOn>,

    #[arg(long)]
    pub online_backup: Option<AddOn>,

    #[arg(long)]
    pub device_protection: Option<AddOn>,

    #[arg(long)]
    pub tech_support: Option<AddOn>,

    #[arg(long)]
    pub streaming_tv: Option<AddOn>,

    #[arg(long)]
    pub streaming_movies: Option<AddOn>,

    #[arg(long, default_value = "Month-to-month")]
    pub contract: Contract,

    #[arg(long, default_value = "No")]
    pub paperless_billing: YesNo,

    #[arg(long, default_value = "Electronic check")]
    pub payment_method: PaymentMethod,

    #[arg(long, default_value = "50.0")]
    pub monthly_charges: f64,

    #[arg(long, default_value = "500.0")]
    pub total_charges: f64,

    /// Print the fully encoded feature vector
    #[arg(long)]
    pub debug: bool,

    /// Save a feature-weight bar chart to this PNG path
    #[arg(long)]
    pub importance_chart: Option<String>,

    /// Print the N strongest churn and loyalty drivers
    #[arg(long)]
    pub top: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Assemble the customer form from `--input` or the individual flags
    ///
    /// The result is not validated yet; see `CustomerInput::validate`.
    pub fn customer_input(&self) -> crate::Result<CustomerInput> {
        if let Some(ref path) = self.input {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read customer form: {}", path.display()))?;
            let input: CustomerInput = serde_json::from_str(&text)
                .with_context(|| format!("parse customer form: {}", path.display()))?;
            return Ok(input);
        }

        let multiple_lines = self
            .multiple_lines
            .unwrap_or(MultipleLines::options_for(self.phone_service)[0]);
        let default_add_on = AddOn::options_for(self.internet_service)[0];
        let add_on = |chosen: Option<AddOn>| chosen.unwrap_or(default_add_on);

        Ok(CustomerInput {
            gender: self.gender,
            senior_citizen: self.senior_citizen,
            partner: self.partner,
            dependents: self.dependents,
            tenure: self.tenure,
            phone_service: self.phone_service,
            multiple_lines,
            internet_service: self.internet_service,
            add_ons: AddOns {
                online_security: add_on(self.online_security),
                online_backup: add_on(self.online_backup),
                device_protection: add_on(self.device_protection),
                tech_support: add_on(self.tech_support),
                streaming_tv: add_on(self.streaming_tv),
                streaming_movies: add_on(self.streaming_movies),
            },
            contract: self.contract,
            paperless_billing: self.paperless_billing,
            payment_method: self.payment_method,
            monthly_charges: self.monthly_charges,
            total_charges: self.total_charges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_form() {
        let args = Args::parse_from(["churnscope"]);
        assert_eq!(args.artifact, PathBuf::from(DEFAULT_ARTIFACT_PATH));

        let input = args.customer_input().unwrap();
        assert_eq!(input, CustomerInput::default());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_conditional_defaults_follow_parent() {
        let args = Args::parse_from([
            "churnscope",
            "--phone-service",
            "Yes",
            "--internet-service",
            "No",
        ]);
        let input = args.customer_input().unwrap();
        assert_eq!(input.multiple_lines, MultipleLines::No);
        assert_eq!(input.add_ons, AddOns::uniform(AddOn::NoInternetService));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_flags_use_training_labels() {
        let args = Args::parse_from([
            "churnscope",
            "--internet-service",
            "fiber optic",
            "--streaming-tv",
            "Yes",
            "--payment-method",
            "Credit card (automatic)",
            "--contract",
            "Two year",
            "--tenure",
            "60",
        ]);
        let input = args.customer_input().unwrap();
        assert_eq!(input.internet_service, InternetService::FiberOptic);
        assert_eq!(input.add_ons.streaming_tv, AddOn::Yes);
        assert_eq!(input.add_ons.online_backup, AddOn::No);
        assert_eq!(input.payment_method, PaymentMethod::CreditCard);
        assert_eq!(input.contract, Contract::TwoYear);
        assert_eq!(input.tenure, 60);
    }

    #[test]
    fn test_unknown_flag_value_is_rejected() {
        let result = Args::try_parse_from(["churnscope", "--contract", "Three year"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_form_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"gender": "Female", "senior_citizen": "No", "partner": "Yes", "dependents": "Yes",
                "tenure": 30, "phone_service": "Yes", "multiple_lines": "No",
                "internet_service": "No", "online_security": "No internet service",
                "online_backup": "No internet service", "device_protection": "No internet service",
                "tech_support": "No internet service", "streaming_tv": "No internet service",
                "streaming_movies": "No internet service", "contract": "One year",
                "paperless_billing": "No", "payment_method": "Mailed check",
                "monthly_charges": 20.0, "total_charges": 600.0}}"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let args = Args::parse_from(["churnscope", "--input", path, "--gender", "Male"]);
        let input = args.customer_input().unwrap();
        assert_eq!(input.gender, Gender::Female);
        assert_eq!(input.internet_service, InternetService::No);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_form_file_missing() {
        let args = Args::parse_from(["churnscope", "--input", "/nonexistent/customer.json"]);
        assert!(args.customer_input().is_err());
    }
}
