use std::borrow::Cow;

use schemars::JsonSchema;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::errors::ApiError;

/// Validation failure of a single request field
#[derive(Debug, Clone, PartialEq, JsonSchema, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Custom validator rejecting empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("Must not be empty")));
    }
    Ok(())
}

/// Custom validator for email addresses, on top of `email`: dots in the local part may
/// only separate non-empty atoms
pub fn dot_atom_local_part(value: &str) -> Result<(), ValidationError> {
    let Some((local, _)) = value.rsplit_once('@') else {
        return Ok(());
    };
    if !local.is_empty() && local.split('.').any(str::is_empty) {
        return Err(ValidationError::new("email")
            .with_message(Cow::Borrowed("Invalid email address")));
    }
    Ok(())
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                let field = camel_case(&field);
                errors.iter().map(move |error| FieldError {
                    field: field.clone(),
                    message: describe(error),
                })
            })
            .collect();
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::Validation(field_errors)
    }
}

/// Field names in request bodies are camelCase
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "email" => "Invalid email address".to_owned(),
        "length" => match (error.params.get("min"), error.params.get("max")) {
            (Some(min), Some(max)) => format!("Must be between {} and {} characters", min, max),
            (Some(min), None) => format!("Length must be at least {}", min),
            (None, Some(max)) => format!("Must be at most {} characters", max),
            (None, None) => "Invalid length".to_owned(),
        },
        code => format!("Invalid value ({})", code),
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 2, max = 100))]
        display_name: String,
        #[validate(email, custom(function = "dot_atom_local_part"))]
        email: String,
        #[validate(custom(function = "not_blank"))]
        api_key_name: String,
    }

    fn sample() -> Sample {
        Sample {
            display_name: "Jane".to_owned(),
            email: "jane@example.com".to_owned(),
            api_key_name: "OPENAI_API_KEY".to_owned(),
        }
    }

    fn errors_of(sample: Sample) -> Vec<FieldError> {
        match sample.validate().map_err(ApiError::from) {
            Ok(()) => vec![],
            Err(ApiError::Validation(errors)) => errors,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(errors_of(sample()).is_empty());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let errors = errors_of(Sample {
            display_name: "éé".to_owned(),
            ..sample()
        });
        assert!(errors.is_empty());

        let errors = errors_of(Sample {
            display_name: "é".to_owned(),
            ..sample()
        });
        assert_eq!(
            errors,
            vec![FieldError {
                field: "displayName".to_owned(),
                message: "Must be between 2 and 100 characters".to_owned(),
            }]
        );
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in [
            "jane",
            "jane@",
            "@example.com",
            "jane@@example.com",
            "ja ne@example.com",
            "jane@-example.com",
            "jane@example..com",
            "jane@exa_mple.com",
            "a..b@example.com",
            ".jane@example.com",
            "jane.@example.com",
        ] {
            let errors = errors_of(Sample {
                email: email.to_owned(),
                ..sample()
            });
            assert_eq!(errors.len(), 1, "{} should be rejected", email);
            assert_eq!(errors[0].field, "email");
            assert_eq!(errors[0].message, "Invalid email address");
        }
    }

    #[test]
    fn accepts_dotted_local_parts() {
        for email in ["j.doe@example.com", "j.doe+tag@mail.example.org"] {
            assert!(errors_of(Sample {
                email: email.to_owned(),
                ..sample()
            })
            .is_empty());
        }
    }

    #[test]
    fn blank_values_use_custom_message() {
        let errors = errors_of(Sample {
            api_key_name: "   ".to_owned(),
            ..sample()
        });
        assert_eq!(
            errors,
            vec![FieldError {
                field: "apiKeyName".to_owned(),
                message: "Must not be empty".to_owned(),
            }]
        );
    }

    #[test]
    fn errors_are_sorted_by_field() {
        let errors = errors_of(Sample {
            display_name: String::new(),
            email: "nope".to_owned(),
            api_key_name: String::new(),
        });
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["apiKeyName", "displayName", "email"]);
    }
}
