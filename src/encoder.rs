//! Feature encoding: customer form values to the classifier's column layout
//!
//! Column lookups are resolved once, when a [`FeatureEncoder`] is built from
//! the schema. Each categorical `(field, value)` pair maps to a column index,
//! or to nothing when that value is the reference category dropped at
//! training time. Encoding a customer is then only indexed writes into a
//! zeroed vector, so a schema that cannot be encoded into is rejected at load
//! rather than on the first request.

use crate::artifact::{FeatureSchema, StandardScaler, NUMERIC_FEATURES};
use crate::data::{
    AddOn, Contract, CustomerInput, Gender, InternetService, MultipleLines, PaymentMethod,
};
use crate::error::EncodeError;
use ndarray::Array1;
use std::fmt;

/// Yes/no style fields that own a single indicator column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryField {
    SeniorCitizen,
    Gender,
    Partner,
    Dependents,
    PhoneService,
    PaperlessBilling,
}

impl BinaryField {
    pub const ALL: [BinaryField; 6] = [
        BinaryField::SeniorCitizen,
        BinaryField::Gender,
        BinaryField::Partner,
        BinaryField::Dependents,
        BinaryField::PhoneService,
        BinaryField::PaperlessBilling,
    ];

    /// Indicator column set when the non-reference option is chosen
    pub fn column(self) -> &'static str {
        match self {
            BinaryField::SeniorCitizen => "SeniorCitizen",
            BinaryField::Gender => "gender_Male",
            BinaryField::Partner => "Partner_Yes",
            BinaryField::Dependents => "Dependents_Yes",
            BinaryField::PhoneService => "PhoneService_Yes",
            BinaryField::PaperlessBilling => "PaperlessBilling_Yes",
        }
    }

    fn is_active(self, input: &CustomerInput) -> bool {
        match self {
            BinaryField::SeniorCitizen => input.senior_citizen.is_yes(),
            BinaryField::Gender => input.gender == Gender::Male,
            BinaryField::Partner => input.partner.is_yes(),
            BinaryField::Dependents => input.dependents.is_yes(),
            BinaryField::PhoneService => input.phone_service.is_yes(),
            BinaryField::PaperlessBilling => input.paperless_billing.is_yes(),
        }
    }
}

/// Multi-valued fields encoded as one indicator column per non-reference value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OneHotField {
    MultipleLines,
    InternetService,
    OnlineSecurity,
    OnlineBackup,
    DeviceProtection,
    TechSupport,
    StreamingTv,
    StreamingMovies,
    Contract,
    PaymentMethod,
}

impl OneHotField {
    pub const ALL: [OneHotField; 10] = [
        OneHotField::MultipleLines,
        OneHotField::InternetService,
        OneHotField::OnlineSecurity,
        OneHotField::OnlineBackup,
        OneHotField::DeviceProtection,
        OneHotField::TechSupport,
        OneHotField::StreamingTv,
        OneHotField::StreamingMovies,
        OneHotField::Contract,
        OneHotField::PaymentMethod,
    ];

    /// Column prefix used by the training-time encoder
    pub fn base_name(self) -> &'static str {
        match self {
            OneHotField::MultipleLines => "MultipleLines",
            OneHotField::InternetService => "InternetService",
            OneHotField::OnlineSecurity => "OnlineSecurity",
            OneHotField::OnlineBackup => "OnlineBackup",
            OneHotField::DeviceProtection => "DeviceProtection",
            OneHotField::TechSupport => "TechSupport",
            OneHotField::StreamingTv => "StreamingTV",
            OneHotField::StreamingMovies => "StreamingMovies",
            OneHotField::Contract => "Contract",
            OneHotField::PaymentMethod => "PaymentMethod",
        }
    }

    /// Every value the form can produce for this field
    pub fn labels(self) -> Vec<&'static str> {
        match self {
            OneHotField::MultipleLines => labels_of(MultipleLines::ALL),
            OneHotField::InternetService => labels_of(InternetService::ALL),
            OneHotField::Contract => labels_of(Contract::ALL),
            OneHotField::PaymentMethod => labels_of(PaymentMethod::ALL),
            _ => labels_of(AddOn::ALL),
        }
    }

    /// Column name for one value, e.g. `InternetService_Fiber optic`
    pub fn column_name(self, label: &str) -> String {
        format!("{}_{}", self.base_name(), label)
    }

    fn selected(self, input: &CustomerInput) -> &'static str {
        let add_ons = &input.add_ons;
        match self {
            OneHotField::MultipleLines => input.multiple_lines.label(),
            OneHotField::InternetService => input.internet_service.label(),
            OneHotField::OnlineSecurity => add_ons.online_security.label(),
            OneHotField::OnlineBackup => add_ons.online_backup.label(),
            OneHotField::DeviceProtection => add_ons.device_protection.label(),
            OneHotField::TechSupport => add_ons.tech_support.label(),
            OneHotField::StreamingTv => add_ons.streaming_tv.label(),
            OneHotField::StreamingMovies => add_ons.streaming_movies.label(),
            OneHotField::Contract => input.contract.label(),
            OneHotField::PaymentMethod => input.payment_method.label(),
        }
    }
}

impl fmt::Display for OneHotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name())
    }
}

fn labels_of<T: Copy + Into<&'static str>>(options: &[T]) -> Vec<&'static str> {
    options.iter().map(|&option| -> &'static str { option.into() }).collect()
}

#[derive(Debug, Clone)]
struct OneHotColumns {
    field: OneHotField,
    /// `(value label, column index)`; `None` marks the reference category
    options: Vec<(&'static str, Option<usize>)>,
}

/// Values of a one-hot field that have no column of their own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCategory {
    pub field: OneHotField,
    pub values: Vec<&'static str>,
}

/// Numeric row aligned to a [`FeatureSchema`], one entry per column
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVector {
    values: Array1<f64>,
}

impl EncodedVector {
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the named column, `None` if the schema has no such column
    pub fn get(&self, schema: &FeatureSchema, column: &str) -> Option<f64> {
        schema.position(column).and_then(|i| self.values.get(i).copied())
    }

    /// `(column, value)` pairs in schema order
    pub fn named<'a>(&'a self, schema: &'a FeatureSchema) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Precomputed column layout for encoding customers against one schema
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    width: usize,
    numeric: [usize; 3],
    binary: Vec<(BinaryField, usize)>,
    one_hot: Vec<OneHotColumns>,
}

impl FeatureEncoder {
    /// Resolve every column the form can touch against `schema`
    pub fn new(schema: &FeatureSchema) -> Result<Self, EncodeError> {
        let mut numeric = [0usize; 3];
        for (slot, column) in numeric.iter_mut().zip(NUMERIC_FEATURES) {
            *slot = schema
                .position(column)
                .ok_or_else(|| EncodeError::SchemaMismatch {
                    column: column.to_string(),
                })?;
        }

        let mut binary = Vec::with_capacity(BinaryField::ALL.len());
        for field in BinaryField::ALL {
            match schema.position(field.column()) {
                Some(index) => binary.push((field, index)),
                None => tracing::debug!(column = field.column(), "binary column not in schema"),
            }
        }

        let one_hot: Vec<OneHotColumns> = OneHotField::ALL
            .iter()
            .map(|&field| OneHotColumns {
                field,
                options: field
                    .labels()
                    .into_iter()
                    .map(|label| (label, schema.position(&field.column_name(label))))
                    .collect(),
            })
            .collect();

        let encoder = Self {
            width: schema.len(),
            numeric,
            binary,
            one_hot,
        };
        encoder.log_reference_categories();
        Ok(encoder)
    }

    /// Number of columns every encoded vector has
    pub fn width(&self) -> usize {
        self.width
    }

    /// For each one-hot field, the values represented by all-zero columns
    pub fn reference_categories(&self) -> Vec<ReferenceCategory> {
        self.one_hot
            .iter()
            .map(|columns| ReferenceCategory {
                field: columns.field,
                values: columns
                    .options
                    .iter()
                    .filter(|(_, index)| index.is_none())
                    .map(|(label, _)| *label)
                    .collect(),
            })
            .collect()
    }

    fn log_reference_categories(&self) {
        for reference in self.reference_categories() {
            match reference.values.len() {
                0 => tracing::debug!(field = %reference.field, "every value has its own column"),
                1 => tracing::debug!(
                    field = %reference.field,
                    reference = reference.values[0],
                    "reference category"
                ),
                _ => tracing::warn!(
                    field = %reference.field,
                    values = ?reference.values,
                    "several values have no column; form and schema may disagree"
                ),
            }
        }
    }

    /// Build the aligned feature vector for one customer
    ///
    /// Assumes `input` is self-consistent (see [`CustomerInput::validate`]).
    pub fn encode(&self, input: &CustomerInput, scaler: &StandardScaler) -> EncodedVector {
        let mut values = Array1::<f64>::zeros(self.width);

        let scaled = scaler.transform(input.numeric_triple());
        for (&index, value) in self.numeric.iter().zip(scaled) {
            values[index] = value;
        }

        for &(field, index) in &self.binary {
            if field.is_active(input) {
                values[index] = 1.0;
            }
        }

        for columns in &self.one_hot {
            let selected = columns.field.selected(input);
            let hit = columns
                .options
                .iter()
                .find(|(label, _)| *label == selected)
                .and_then(|(_, index)| *index);
            if let Some(index) = hit {
                values[index] = 1.0;
            }
        }

        tracing::trace!(width = self.width, "encoded customer");
        EncodedVector { values }
    }
}

/// Encode one customer against `schema`
///
/// Fails only when one of the numeric columns is missing from the schema.
/// Categorical values without a column are the reference category and leave
/// their field all zero.
pub fn encode(
    input: &CustomerInput,
    schema: &FeatureSchema,
    scaler: &StandardScaler,
) -> Result<EncodedVector, EncodeError> {
    Ok(FeatureEncoder::new(schema)?.encode(input, scaler))
}
