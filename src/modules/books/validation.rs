//! Field constraints for create requests and partial updates.

use std::fmt;

use validator::Validate;

use super::models::{not_blank, BookView};

/// Fields reported in this order, whatever order the validator yields them in.
const FIELD_ORDER: [&str; 3] = ["title", "author", "description"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Check a create request against the field constraints.
pub fn validate_view(view: &BookView) -> Vec<FieldError> {
    let Err(errors) = view.validate() else {
        return Vec::new();
    };
    let by_field = errors.field_errors();

    let mut field_errors = Vec::new();
    for field in FIELD_ORDER {
        let Some(failures) = by_field.get(field) else {
            continue;
        };
        for failure in failures.iter() {
            let message = failure
                .message
                .as_ref()
                .map(|message| message.to_string())
                .unwrap_or_else(|| format!("{} is invalid ({})", field, failure.code));
            field_errors.push(FieldError { field, message });
        }
    }
    field_errors
}

/// Join field errors into the single message returned to clients.
pub fn combined_message(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Title check applied to partial updates. Lengths are not re-checked there.
pub fn is_blank(value: &str) -> bool {
    not_blank(value).is_err()
}
