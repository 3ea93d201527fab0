use serde::Serialize;

pub const REQUIRED_FIELD_MESSAGE: &str = "This field is required";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email";

/// JSON body for `POST /api/contact/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
}

/// Snapshot of one form control at submit time.
#[derive(Debug, Clone, Copy)]
pub struct FieldValue<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub required: bool,
    pub is_email: bool,
}

/// One inline error to render next to the named control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: &'static str,
}

/// Client-side checks: required fields must be non-blank and email controls
/// must look like `local@domain.tld`. At most one error per field.
pub fn validate_fields(fields: &[FieldValue<'_>]) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for field in fields {
        if field.required && field.value.trim().is_empty() {
            errors.push(FieldError {
                field: field.name.to_string(),
                message: REQUIRED_FIELD_MESSAGE,
            });
        } else if field.is_email && !is_well_formed_email(field.value) {
            errors.push(FieldError {
                field: field.name.to_string(),
                message: INVALID_EMAIL_MESSAGE,
            });
        }
    }
    errors
}

/// Mirrors the server's acceptance pattern `^[^\s@]+@[^\s@]+\.[^\s@]+$`:
/// exactly one `@`, no whitespace, and some dot in the domain with text on
/// both sides. Dots count as domain text, so `a@b.c.` is well-formed.
pub fn is_well_formed_email(raw: &str) -> bool {
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let domain = domain.as_bytes();
    domain.len() >= 3 && domain[1..domain.len() - 1].contains(&b'.')
}

/// Assembles the submit payload; an absent company field is sent as an empty
/// string, matching what the API stores by default.
pub fn build_payload(
    name: &str,
    email: &str,
    company: Option<&str>,
    message: &str,
) -> ContactPayload {
    ContactPayload {
        name: name.to_string(),
        email: email.to_string(),
        company: company.unwrap_or_default().to_string(),
        message: message.to_string(),
    }
}
