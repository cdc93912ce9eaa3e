use std::time::Instant;

use inferences::{FeatureVector, Label, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BMI_MIN: f64 = 18.0;
pub const BMI_MAX: f64 = 50.0;
pub const BMI_STEP: f64 = 0.1;

pub const INCOMPLETE_FORM_MESSAGE: &str = "Fill in all the values for better prediction.";
pub const DIABETIC_MESSAGE: &str = "The person is predicted to be diabetic.";
pub const NON_DIABETIC_MESSAGE: &str = "The person is predicted to be non-diabetic.";

/// Answer to a two-valued question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub const ALL: [YesNo; 2] = [YesNo::Yes, YesNo::No];

    pub fn encode(self) -> f32 {
        match self {
            YesNo::Yes => 1.0,
            YesNo::No => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn encode(self) -> f32 {
        match self {
            Sex::Male => 1.0,
            Sex::Female => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

/// Self-rated general health, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum GenHlth {
    Excellent,
    #[serde(rename = "Very Good", alias = "VeryGood")]
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl GenHlth {
    pub const ALL: [GenHlth; 5] = [
        GenHlth::Excellent,
        GenHlth::VeryGood,
        GenHlth::Good,
        GenHlth::Fair,
        GenHlth::Poor,
    ];

    /// Rank used by the model, 1 (excellent) to 5 (poor).
    pub fn rank(self) -> u8 {
        match self {
            GenHlth::Excellent => 1,
            GenHlth::VeryGood => 2,
            GenHlth::Good => 3,
            GenHlth::Fair => 4,
            GenHlth::Poor => 5,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        GenHlth::ALL.iter().copied().find(|g| g.rank() == rank)
    }

    pub fn label(self) -> &'static str {
        match self {
            GenHlth::Excellent => "Excellent",
            GenHlth::VeryGood => "Very Good",
            GenHlth::Good => "Good",
            GenHlth::Fair => "Fair",
            GenHlth::Poor => "Poor",
        }
    }
}

pub const AGE_RANGES: [&str; 13] = [
    "18-24 years old",
    "25-29 years old",
    "30-34 years old",
    "35-39 years old",
    "40-44 years old",
    "45-49 years old",
    "50-54 years old",
    "55-59 years old",
    "60-64 years old",
    "65-69 years old",
    "70-74 years old",
    "75-79 years old",
    "80 years old or older",
];

/// Five-year age bucket, coded 1 to 13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeGroup(u8);

impl AgeGroup {
    pub fn new(code: u32) -> Option<Self> {
        if (1..=AGE_RANGES.len() as u32).contains(&code) {
            Some(AgeGroup(code as u8))
        } else {
            None
        }
    }

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn range(self) -> &'static str {
        AGE_RANGES[(self.0 - 1) as usize]
    }

    pub fn all() -> impl Iterator<Item = AgeGroup> {
        (1..=AGE_RANGES.len() as u8).map(AgeGroup)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeRow {
    pub code: u8,
    pub range: &'static str,
}

pub fn age_table() -> Vec<AgeRow> {
    AgeGroup::all()
        .map(|age| AgeRow {
            code: age.code(),
            range: age.range(),
        })
        .collect()
}

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("{} Missing: {}", INCOMPLETE_FORM_MESSAGE, .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Raw answers as submitted. Every field starts out unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FormInput {
    #[serde(rename = "HighBP", default)]
    pub high_bp: Option<YesNo>,
    #[serde(rename = "HighChol", default)]
    pub high_chol: Option<YesNo>,
    #[serde(rename = "BMI", default)]
    pub bmi: Option<f64>,
    #[serde(rename = "Smoker", default)]
    pub smoker: Option<YesNo>,
    #[serde(rename = "Stroke", default)]
    pub stroke: Option<YesNo>,
    #[serde(rename = "HeartDiseaseorAttack", default)]
    pub heart_disease_or_attack: Option<YesNo>,
    #[serde(rename = "PhysActivity", default)]
    pub phys_activity: Option<YesNo>,
    #[serde(rename = "HvyAlcoholConsump", default)]
    pub hvy_alcohol_consump: Option<YesNo>,
    #[serde(rename = "DiffWalk", default)]
    pub diff_walk: Option<YesNo>,
    #[serde(rename = "Sex", default)]
    pub sex: Option<Sex>,
    #[serde(rename = "GenHlth", default)]
    pub gen_hlth: Option<GenHlth>,
    #[serde(rename = "Age", default)]
    pub age: Option<u32>,
}

impl FormInput {
    /// Names of unset fields, in the order they appear on the form.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields: [(&'static str, bool); 12] = [
            ("HighBP", self.high_bp.is_some()),
            ("HighChol", self.high_chol.is_some()),
            ("BMI", self.bmi.is_some()),
            ("Smoker", self.smoker.is_some()),
            ("Stroke", self.stroke.is_some()),
            ("HeartDiseaseorAttack", self.heart_disease_or_attack.is_some()),
            ("PhysActivity", self.phys_activity.is_some()),
            ("HvyAlcoholConsump", self.hvy_alcohol_consump.is_some()),
            ("DiffWalk", self.diff_walk.is_some()),
            ("Sex", self.sex.is_some()),
            ("GenHlth", self.gen_hlth.is_some()),
            ("Age", self.age.is_some()),
        ];

        fields
            .iter()
            .filter(|(_, set)| !set)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Checks that every answer is present and in range.
    pub fn validate(&self) -> Result<CompletedForm, FormError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(FormError::Incomplete { missing });
        }
        let incomplete = || FormError::Incomplete {
            missing: Vec::new(),
        };

        let bmi = self.bmi.ok_or_else(incomplete)?;
        if !(BMI_MIN..=BMI_MAX).contains(&bmi) {
            return Err(FormError::OutOfRange {
                field: "BMI",
                value: bmi,
                min: BMI_MIN,
                max: BMI_MAX,
            });
        }

        let age_code = self.age.ok_or_else(incomplete)?;
        let age = AgeGroup::new(age_code).ok_or(FormError::OutOfRange {
            field: "Age",
            value: age_code as f64,
            min: 1.0,
            max: AGE_RANGES.len() as f64,
        })?;

        Ok(CompletedForm {
            high_bp: self.high_bp.ok_or_else(incomplete)?,
            high_chol: self.high_chol.ok_or_else(incomplete)?,
            bmi,
            smoker: self.smoker.ok_or_else(incomplete)?,
            stroke: self.stroke.ok_or_else(incomplete)?,
            heart_disease_or_attack: self.heart_disease_or_attack.ok_or_else(incomplete)?,
            phys_activity: self.phys_activity.ok_or_else(incomplete)?,
            hvy_alcohol_consump: self.hvy_alcohol_consump.ok_or_else(incomplete)?,
            diff_walk: self.diff_walk.ok_or_else(incomplete)?,
            sex: self.sex.ok_or_else(incomplete)?,
            gen_hlth: self.gen_hlth.ok_or_else(incomplete)?,
            age,
        })
    }
}

/// A form with every answer present and checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedForm {
    pub high_bp: YesNo,
    pub high_chol: YesNo,
    pub bmi: f64,
    pub smoker: YesNo,
    pub stroke: YesNo,
    pub heart_disease_or_attack: YesNo,
    pub phys_activity: YesNo,
    pub hvy_alcohol_consump: YesNo,
    pub diff_walk: YesNo,
    pub sex: Sex,
    pub gen_hlth: GenHlth,
    pub age: AgeGroup,
}

impl CompletedForm {
    pub fn to_feature_vector(&self) -> FeatureVector {
        let values: [f32; FEATURE_COUNT] = [
            self.high_bp.encode(),
            self.high_chol.encode(),
            self.bmi as f32,
            self.smoker.encode(),
            self.stroke.encode(),
            self.heart_disease_or_attack.encode(),
            self.phys_activity.encode(),
            self.hvy_alcohol_consump.encode(),
            self.gen_hlth.rank() as f32,
            self.diff_walk.encode(),
            self.sex.encode(),
            self.age.code() as f32,
        ];
        FeatureVector::new(values)
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct EncodedFeature {
    pub name: String,
    pub value: f32,
}

#[derive(Debug, Serialize, Clone)]
pub struct PredictionResult {
    pub label: Label,
    pub class: u8,
    pub diabetic: bool,
    pub message: String,
    pub features: Vec<EncodedFeature>,
    pub timestamp: String,
}

impl PredictionResult {
    pub fn new(label: Label, features: &FeatureVector) -> Self {
        PredictionResult {
            label,
            class: label.class(),
            diabetic: label.is_diabetic(),
            message: Self::outcome_message(label).to_string(),
            features: features
                .named()
                .into_iter()
                .map(|(name, value)| EncodedFeature {
                    name: name.to_string(),
                    value,
                })
                .collect(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn outcome_message(label: Label) -> &'static str {
        match label {
            Label::Diabetic => DIABETIC_MESSAGE,
            Label::NonDiabetic => NON_DIABETIC_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BmiRequest {
    pub height_cm: f64,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BmiResponse {
    pub bmi: f64,
    pub display: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: String,
    pub execution_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn timed(mut self, start: Instant) -> Self {
        self.execution_time_ms = Some(start.elapsed().as_millis() as u64);
        self
    }
}
