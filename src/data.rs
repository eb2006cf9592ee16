//! Customer form values and the option sets the form offers
//!
//! Every categorical value carries the exact label the training-time encoder
//! produced (`"Fiber optic"`, `"No internet service"`, ...). The labels are
//! matched case-insensitively on input and always rendered in training
//! spelling, so column names derived from them line up with the schema.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest tenure the form accepts, in months
pub const MAX_TENURE_MONTHS: u32 = 72;

macro_rules! form_options {
    ($(#[$meta:meta])* $name:ident, $field:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every option, in the order the form lists them
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Training-time label of this option
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = InputError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| option.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| InputError::UnknownValue {
                        field: $field,
                        value: s.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|option| option.label())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = InputError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(option: $name) -> Self {
                option.label()
            }
        }
    };
}

form_options!(
    /// Customer gender as recorded in the training data
    Gender, "gender" {
        Male => "Male",
        Female => "Female",
    }
);

form_options!(
    /// Plain yes/no selector
    YesNo, "yes/no field" {
        No => "No",
        Yes => "Yes",
    }
);

form_options!(
    /// Multiple lines; `NoPhoneService` is the only option without phone service
    MultipleLines, "multiple lines" {
        No => "No",
        Yes => "Yes",
        NoPhoneService => "No phone service",
    }
);

form_options!(
    InternetService, "internet service" {
        Dsl => "DSL",
        FiberOptic => "Fiber optic",
        No => "No",
    }
);

form_options!(
    /// Internet-dependent add-on (security, backup, streaming, ...)
    AddOn, "internet add-on" {
        No => "No",
        Yes => "Yes",
        NoInternetService => "No internet service",
    }
);

form_options!(
    Contract, "contract" {
        MonthToMonth => "Month-to-month",
        OneYear => "One year",
        TwoYear => "Two year",
    }
);

form_options!(
    PaymentMethod, "payment method" {
        ElectronicCheck => "Electronic check",
        MailedCheck => "Mailed check",
        BankTransfer => "Bank transfer (automatic)",
        CreditCard => "Credit card (automatic)",
    }
);

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }
}

impl MultipleLines {
    /// Options the form offers for a given phone service selection
    pub fn options_for(phone_service: YesNo) -> &'static [MultipleLines] {
        match phone_service {
            YesNo::No => &[MultipleLines::NoPhoneService],
            YesNo::Yes => &[MultipleLines::No, MultipleLines::Yes],
        }
    }
}

impl AddOn {
    /// Options the form offers for a given internet service selection
    pub fn options_for(internet: InternetService) -> &'static [AddOn] {
        match internet {
            InternetService::No => &[AddOn::NoInternetService],
            InternetService::Dsl | InternetService::FiberOptic => &[AddOn::No, AddOn::Yes],
        }
    }
}

/// The six add-on services that require internet service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOns {
    pub online_security: AddOn,
    pub online_backup: AddOn,
    pub device_protection: AddOn,
    pub tech_support: AddOn,
    pub streaming_tv: AddOn,
    pub streaming_movies: AddOn,
}

impl AddOns {
    /// Every add-on set to the same option
    pub fn uniform(option: AddOn) -> Self {
        Self {
            online_security: option,
            online_backup: option,
            device_protection: option,
            tech_support: option,
            streaming_tv: option,
            streaming_movies: option,
        }
    }

    /// `(field name, selection)` pairs in form order
    pub fn entries(&self) -> [(&'static str, AddOn); 6] {
        [
            ("online security", self.online_security),
            ("online backup", self.online_backup),
            ("device protection", self.device_protection),
            ("tech support", self.tech_support),
            ("streaming TV", self.streaming_tv),
            ("streaming movies", self.streaming_movies),
        ]
    }
}

/// One customer's form values, collected fresh for every prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInput {
    pub gender: Gender,
    pub senior_citizen: YesNo,
    pub partner: YesNo,
    pub dependents: YesNo,
    /// Months with the company
    pub tenure: u32,
    pub phone_service: YesNo,
    pub multiple_lines: MultipleLines,
    pub internet_service: InternetService,
    #[serde(flatten)]
    pub add_ons: AddOns,
    pub contract: Contract,
    pub paperless_billing: YesNo,
    pub payment_method: PaymentMethod,
    pub monthly_charges: f64,
    pub total_charges: f64,
}

impl Default for CustomerInput {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            senior_citizen: YesNo::No,
            partner: YesNo::No,
            dependents: YesNo::No,
            tenure: 12,
            phone_service: YesNo::No,
            multiple_lines: MultipleLines::NoPhoneService,
            internet_service: InternetService::Dsl,
            add_ons: AddOns::uniform(AddOn::No),
            contract: Contract::MonthToMonth,
            paperless_billing: YesNo::No,
            payment_method: PaymentMethod::ElectronicCheck,
            monthly_charges: 50.0,
            total_charges: 500.0,
        }
    }
}

impl CustomerInput {
    /// Numeric fields in scaler order: tenure, monthly charges, total charges
    pub fn numeric_triple(&self) -> [f64; 3] {
        [
            f64::from(self.tenure),
            self.monthly_charges,
            self.total_charges,
        ]
    }

    /// Check numeric bounds and that conditional selectors only hold options
    /// the form would have offered for their parent selection
    pub fn validate(&self) -> Result<(), InputError> {
        if self.tenure > MAX_TENURE_MONTHS {
            return Err(InputError::OutOfRange {
                field: "tenure",
                value: f64::from(self.tenure),
                min: 0.0,
                max: f64::from(MAX_TENURE_MONTHS),
            });
        }
        check_charge("monthly charges", self.monthly_charges)?;
        check_charge("total charges", self.total_charges)?;

        if !MultipleLines::options_for(self.phone_service).contains(&self.multiple_lines) {
            return Err(InputError::InconsistentOptions {
                field: "multiple lines",
                value: self.multiple_lines.label(),
                depends_on: "phone service",
                parent: self.phone_service.label(),
            });
        }

        let offered = AddOn::options_for(self.internet_service);
        for (field, selected) in self.add_ons.entries() {
            if !offered.contains(&selected) {
                return Err(InputError::InconsistentOptions {
                    field,
                    value: selected.label(),
                    depends_on: "internet service",
                    parent: self.internet_service.label(),
                });
            }
        }

        Ok(())
    }
}

fn check_charge(field: &'static str, value: f64) -> Result<(), InputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InputError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: f64::INFINITY,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_parse_case_insensitively() {
        assert_eq!("fiber OPTIC".parse::<InternetService>().unwrap(), InternetService::FiberOptic);
        assert_eq!(" No internet service ".parse::<AddOn>().unwrap(), AddOn::NoInternetService);
        assert_eq!(
            "bank transfer (automatic)".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankTransfer
        );
        assert_eq!(Contract::MonthToMonth.to_string(), "Month-to-month");
    }

    #[test]
    fn test_unknown_label_lists_options() {
        let err = "Satellite".parse::<InternetService>().unwrap_err();
        match err {
            InputError::UnknownValue { field, expected, .. } => {
                assert_eq!(field, "internet service");
                assert_eq!(expected, "DSL, Fiber optic, No");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_default_input_is_valid() {
        assert!(CustomerInput::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_lines_without_phone() {
        let input = CustomerInput {
            phone_service: YesNo::No,
            multiple_lines: MultipleLines::Yes,
            ..CustomerInput::default()
        };
        assert!(matches!(
            input.validate(),
            Err(InputError::InconsistentOptions { field: "multiple lines", .. })
        ));

        let input = CustomerInput {
            phone_service: YesNo::Yes,
            multiple_lines: MultipleLines::NoPhoneService,
            ..CustomerInput::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_add_ons_without_internet() {
        let input = CustomerInput {
            internet_service: InternetService::No,
            add_ons: AddOns {
                streaming_tv: AddOn::Yes,
                ..AddOns::uniform(AddOn::NoInternetService)
            },
            ..CustomerInput::default()
        };
        assert!(matches!(
            input.validate(),
            Err(InputError::InconsistentOptions { field: "streaming TV", .. })
        ));

        let input = CustomerInput {
            internet_service: InternetService::FiberOptic,
            add_ons: AddOns::uniform(AddOn::NoInternetService),
            ..CustomerInput::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_numeric_bounds() {
        let input = CustomerInput { tenure: 73, ..CustomerInput::default() };
        assert!(matches!(input.validate(), Err(InputError::OutOfRange { field: "tenure", .. })));

        let input = CustomerInput { monthly_charges: -1.0, ..CustomerInput::default() };
        assert!(input.validate().is_err());

        let input = CustomerInput { total_charges: f64::NAN, ..CustomerInput::default() };
        assert!(input.validate().is_err());

        let input = CustomerInput { tenure: 72, total_charges: 0.0, ..CustomerInput::default() };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_json_form_round_trip() {
        let json = r#"{
            "gender": "female", "senior_citizen": "Yes", "partner": "No", "dependents": "No",
            "tenure": 5, "phone_service": "Yes", "multiple_lines": "Yes",
            "internet_service": "Fiber optic",
            "online_security": "No", "online_backup": "Yes", "device_protection": "No",
            "tech_support": "No", "streaming_tv": "Yes", "streaming_movies": "Yes",
            "contract": "month-to-month", "paperless_billing": "Yes",
            "payment_method": "Electronic check",
            "monthly_charges": 99.5, "total_charges": 480.0
        }"#;
        let input: CustomerInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.gender, Gender::Female);
        assert_eq!(input.contract, Contract::MonthToMonth);
        assert_eq!(input.add_ons.online_backup, AddOn::Yes);
        assert!(input.validate().is_ok());

        let rendered = serde_json::to_value(&input).unwrap();
        assert_eq!(rendered["internet_service"], "Fiber optic");
        assert_eq!(rendered["contract"], "Month-to-month");
    }
}
