use crate::models::card::CardDetails;
use crate::models::patient::PatientInput;
use anyhow::{bail, Result};

/// Blood groups are stored as 1 (O) through 4 (AB)
pub const BLOOD_TYPE_RANGE: std::ops::RangeInclusive<i16> = 1..=4;
pub const DISABILITY_GROUP_RANGE: std::ops::RangeInclusive<i16> = 1..=3;

/// Passport numbers that collide with static `/patients/...` routes
pub const RESERVED_PASSPORT_NUMBERS: [&str; 2] = ["me", "cards"];

/// Validates a patient payload. `require_password` is set on registration,
/// where a password must be present; updates may omit it.
pub fn validate_patient(input: &PatientInput, require_password: bool) -> Result<()> {
    require_non_blank("full_name", &input.full_name)?;
    require_non_blank("passport_number", &input.passport_number)?;
    require_non_blank("login", &input.login)?;
    if RESERVED_PASSPORT_NUMBERS.contains(&input.passport_number.as_str()) {
        bail!("'passport_number' must not be '{}'", input.passport_number);
    }

    match input.password.as_deref() {
        Some(p) if p.is_empty() => bail!("'password' must not be empty"),
        None if require_password => bail!("'password' is required"),
        _ => {}
    }

    Ok(())
}

/// Validates the medical fields of a card
pub fn validate_card(details: &CardDetails) -> Result<()> {
    if !BLOOD_TYPE_RANGE.contains(&details.blood_type) {
        bail!(
            "'blood_type' must be between {} and {}, got {}",
            BLOOD_TYPE_RANGE.start(),
            BLOOD_TYPE_RANGE.end(),
            details.blood_type
        );
    }

    if let Some(group) = details.disability_group {
        if !DISABILITY_GROUP_RANGE.contains(&group) {
            bail!(
                "'disability_group' must be between {} and {}, got {}",
                DISABILITY_GROUP_RANGE.start(),
                DISABILITY_GROUP_RANGE.end(),
                group
            );
        }
    }

    for (i, disease) in details.chronic_diseases.iter().enumerate() {
        require_non_blank(&format!("chronic_diseases[{i}]"), disease)?;
    }

    for (i, consultation) in details.consultations.iter().enumerate() {
        require_non_blank(&format!("consultations[{i}].doctor_id"), &consultation.doctor_id)?;
    }

    Ok(())
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("'{}' must not be empty", field);
    }
    Ok(())
}
