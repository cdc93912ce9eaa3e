use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of inputs the classifier expects.
pub const FEATURE_COUNT: usize = 12;

/// Column order the model was trained with.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "HighBP",
    "HighChol",
    "BMI",
    "Smoker",
    "Stroke",
    "HeartDiseaseorAttack",
    "PhysActivity",
    "HvyAlcoholConsump",
    "GenHlth",
    "DiffWalk",
    "Sex",
    "Age",
];

/// Numeric model input, one value per entry of [`FEATURE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f32; FEATURE_COUNT]) -> Self {
        FeatureVector(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Looks a value up by its column name.
    pub fn get(&self, name: &str) -> Option<f32> {
        FEATURE_ORDER
            .iter()
            .position(|column| *column == name)
            .map(|idx| self.0[idx])
    }

    pub fn named(&self) -> Vec<(&'static str, f32)> {
        FEATURE_ORDER.iter().copied().zip(self.0.iter().copied()).collect()
    }
}

/// Binary outcome of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    NonDiabetic,
    Diabetic,
}

impl Label {
    /// Maps a raw class index to a label; anything but 0 or 1 is rejected.
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(Label::NonDiabetic),
            1 => Some(Label::Diabetic),
            _ => None,
        }
    }

    pub fn class(self) -> u8 {
        match self {
            Label::NonDiabetic => 0,
            Label::Diabetic => 1,
        }
    }

    pub fn is_diabetic(self) -> bool {
        self == Label::Diabetic
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::NonDiabetic => "non-diabetic",
            Label::Diabetic => "diabetic",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_follows_model_order() {
        let mut values = [0.0; FEATURE_COUNT];
        for (idx, value) in values.iter_mut().enumerate() {
            *value = idx as f32;
        }
        let vector = FeatureVector::new(values);

        assert_eq!(vector.len(), 12);
        assert_eq!(vector.get("HighBP"), Some(0.0));
        assert_eq!(vector.get("BMI"), Some(2.0));
        assert_eq!(vector.get("GenHlth"), Some(8.0));
        assert_eq!(vector.get("DiffWalk"), Some(9.0));
        assert_eq!(vector.get("Age"), Some(11.0));
        assert_eq!(vector.get("Income"), None);
    }

    #[test]
    fn named_pairs_keep_order() {
        let vector = FeatureVector::new([1.0; FEATURE_COUNT]);
        let names: Vec<&str> = vector.named().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, FEATURE_ORDER.to_vec());
    }

    #[test]
    fn only_binary_classes_map_to_labels() {
        assert_eq!(Label::from_class(0), Some(Label::NonDiabetic));
        assert_eq!(Label::from_class(1), Some(Label::Diabetic));
        assert_eq!(Label::from_class(2), None);
        assert_eq!(Label::from_class(-1), None);
    }

    #[test]
    fn label_serializes_as_outcome_name() {
        assert_eq!(serde_json::to_string(&Label::Diabetic).unwrap(), "\"diabetic\"");
        assert_eq!(
            serde_json::to_string(&Label::NonDiabetic).unwrap(),
            "\"non-diabetic\""
        );
        assert_eq!(Label::Diabetic.class(), 1);
        assert!(!Label::NonDiabetic.is_diabetic());
    }
}
