//! Student records and registration input.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::car_number::CarNumber;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// A registered student. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub car_number: CarNumber,
    pub created_at: Timestamp,
}

impl Student {
    /// `"first last"`, the form denormalized onto queue entries.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Raw registration input, as received from a form or a seed file.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStudent {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(range(min = 1, message = "car number must be a positive integer"))]
    pub car_number: i64,
}

impl CreateStudent {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, car_number: i64) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            car_number,
        }
    }

    /// Validate and normalize into a [`NewStudent`] ready for the store.
    pub fn validate_into(self) -> Result<NewStudent, CoreError> {
        self.validate()
            .map_err(|e| CoreError::InvalidInput(describe(&e)))?;
        Ok(NewStudent {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            car_number: CarNumber::new(self.car_number)?,
        })
    }
}

/// Flatten field errors into `"field: reason"` pairs, sorted by field.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reason = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{field}: {reason}")
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be empty".into()));
    }
    Ok(())
}

/// Validated registration data. Only obtainable through
/// [`CreateStudent::validate_into`], so stores can insert it as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    first_name: String,
    last_name: String,
    car_number: CarNumber,
}

impl NewStudent {
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn car_number(&self) -> CarNumber {
        self.car_number
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
