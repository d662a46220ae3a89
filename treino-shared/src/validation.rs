use std::collections::BTreeMap;

use validator::{ValidationErrors, ValidationErrorsKind};

/// Canonical form used for storing and looking up emails.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Flatten validator errors into `field path -> messages`.
///
/// Nested list items are addressed as `exercises[1].order`.
pub fn validation_details(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut details = BTreeMap::new();
    collect(errors, None, &mut details);
    details
}

fn collect(
    errors: &ValidationErrors,
    prefix: Option<&str>,
    out: &mut BTreeMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = out.entry(path).or_insert_with(Vec::new);
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, Some(&format!("{path}[{index}]")), out);
                }
            }
        }
    }
}
