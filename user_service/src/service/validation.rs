use super::errors::UserError;

/// Upper bound on a supplied password, in bytes
pub const MAX_PASSWORD_BYTES: usize = 1024;

/// Check a user name and return it trimmed
///
/// After trimming the name must be non-empty, at most `max_length` characters long and
/// free of control characters, bidirectional overrides and zero-width characters.
pub fn validate_name(raw: &str, max_length: usize) -> Result<String, UserError> {
    let name = raw.trim();

    if name.is_empty() {
        return Err(UserError::validation("name", "must not be empty"));
    }

    if name.chars().count() > max_length {
        return Err(UserError::validation(
            "name",
            format!("must be no longer than {max_length} characters"),
        ));
    }

    if name.chars().any(char::is_control) {
        return Err(UserError::validation(
            "name",
            "must not contain control characters",
        ));
    }

    if name.chars().any(is_invisible_format_char) {
        return Err(UserError::validation(
            "name",
            "must not contain invisible formatting characters",
        ));
    }

    Ok(name.to_string())
}

/// Format characters that reorder or hide text when a name is displayed
fn is_invisible_format_char(c: char) -> bool {
    matches!(
        c,
        '\u{061C}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    )
}

pub fn validate_password(raw: &str) -> Result<(), UserError> {
    if raw.is_empty() {
        return Err(UserError::validation("password", "must not be empty"));
    }
    if raw.len() > MAX_PASSWORD_BYTES {
        return Err(UserError::validation(
            "password",
            format!("must be no longer than {MAX_PASSWORD_BYTES} bytes"),
        ));
    }
    Ok(())
}
