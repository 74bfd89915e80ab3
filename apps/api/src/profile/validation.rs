use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::profile::Currency;

/// Raw profile form as submitted. Every field defaults so that missing
/// inputs surface as field errors instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub role: String,
    pub years_of_experience: i32,
    pub location: String,
    pub interview_rate: i32,
    pub interview_rate_currency: String,
}

/// A profile update that passed validation. Text fields are trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProfile {
    pub name: String,
    pub role: String,
    pub years_of_experience: i32,
    pub location: String,
    pub interview_rate: i32,
    pub interview_rate_currency: Currency,
}

/// Validates every field and reports all failures at once.
pub fn validate_update(req: &UpdateProfileRequest) -> Result<UpdateProfile, AppError> {
    let mut errors = BTreeMap::new();

    let name = req.name.trim();
    if name.is_empty() {
        errors.insert("name".to_string(), "Name is required".to_string());
    }

    let role = req.role.trim();
    if role.is_empty() {
        errors.insert("role".to_string(), "Role is required".to_string());
    }

    if req.years_of_experience < 1 {
        errors.insert(
            "years_of_experience".to_string(),
            "Years of experience must be at least 1".to_string(),
        );
    }

    let location = req.location.trim();
    if location.is_empty() {
        errors.insert("location".to_string(), "Location is required".to_string());
    }

    if req.interview_rate < 1 {
        errors.insert(
            "interview_rate".to_string(),
            "Interview rate must be at least 1".to_string(),
        );
    }

    let currency = Currency::parse(req.interview_rate_currency.trim());
    if currency.is_none() {
        errors.insert(
            "interview_rate_currency".to_string(),
            "Please select a valid currency".to_string(),
        );
    }

    match currency {
        Some(interview_rate_currency) if errors.is_empty() => Ok(UpdateProfile {
            name: name.to_string(),
            role: role.to_string(),
            years_of_experience: req.years_of_experience,
            location: location.to_string(),
            interview_rate: req.interview_rate,
            interview_rate_currency,
        }),
        _ => Err(AppError::InvalidFields(errors)),
    }
}
