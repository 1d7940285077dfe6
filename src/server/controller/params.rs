use std::str::FromStr;

use crate::{
    model::api::FieldErrorDto,
    server::{error::validation::ValidationError, model::entity::EntityProfile},
};

/// Collects field errors while parsing query parameters.
#[derive(Debug, Default)]
pub struct ParamErrors {
    errors: Vec<FieldErrorDto>,
}

impl ParamErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldErrorDto {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Parses an optional parameter, recording `message` when it is present but invalid.
    ///
    /// Blank values are treated as absent.
    pub fn parse<T: FromStr>(
        &mut self,
        field: &str,
        value: Option<&str>,
        message: &str,
    ) -> Option<T> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.push(field, message);
                None
            }
        }
    }

    /// Like [`ParamErrors::parse`], also rejecting values outside `min..=max`.
    pub fn parse_in_range<T>(
        &mut self,
        field: &str,
        value: Option<&str>,
        min: T,
        max: T,
    ) -> Option<T>
    where
        T: FromStr + PartialOrd + std::fmt::Display + Copy,
    {
        let message = format!("must be an integer between {min} and {max}");
        let parsed: T = self.parse(field, value, &message)?;
        if parsed < min || parsed > max {
            self.push(field, message);
            return None;
        }
        Some(parsed)
    }

    /// Validates an entity slug, returning it trimmed.
    pub fn entity_slug(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        if !EntityProfile::is_valid_slug(value) {
            self.push(field, "must be a lowercase entity slug");
            return None;
        }
        Some(value.to_string())
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}
