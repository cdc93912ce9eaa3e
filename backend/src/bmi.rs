//! Body-mass index helper for the calculator panel.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BmiError {
    #[error("height must be greater than 0 cm (got {0})")]
    NonPositiveHeight(f64),
    #[error("weight cannot be negative (got {0})")]
    NegativeWeight(f64),
    #[error("height and weight must be numbers")]
    NotANumber,
}

/// `weight / (height / 100)^2`, with height in centimeters and weight in kilograms.
pub fn compute(height_cm: f64, weight_kg: f64) -> Result<f64, BmiError> {
    if !height_cm.is_finite() || !weight_kg.is_finite() {
        return Err(BmiError::NotANumber);
    }
    if height_cm <= 0.0 {
        return Err(BmiError::NonPositiveHeight(height_cm));
    }
    if weight_kg < 0.0 {
        return Err(BmiError::NegativeWeight(weight_kg));
    }

    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

pub fn format(bmi: f64) -> String {
    format!("{:.2}", bmi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typical_adult() {
        let bmi = compute(170.0, 70.0).unwrap();
        assert!((bmi - 24.22).abs() < 0.01);
        assert_eq!(format(bmi), "24.22");
    }

    #[test]
    fn zero_height_is_an_error() {
        assert_eq!(compute(0.0, 70.0), Err(BmiError::NonPositiveHeight(0.0)));
        assert_eq!(compute(-150.0, 70.0), Err(BmiError::NonPositiveHeight(-150.0)));
    }

    #[test]
    fn zero_weight_is_allowed() {
        assert_eq!(compute(180.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn bad_inputs_are_reported() {
        assert_eq!(compute(170.0, -1.0), Err(BmiError::NegativeWeight(-1.0)));
        assert_eq!(compute(f64::NAN, 70.0), Err(BmiError::NotANumber));
        assert_eq!(compute(170.0, f64::INFINITY), Err(BmiError::NotANumber));
    }

    #[test]
    fn formats_two_decimals() {
        assert_eq!(format(18.0), "18.00");
        assert_eq!(format(31.4159), "31.42");
    }
}
