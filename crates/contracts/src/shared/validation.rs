//! Field-level checks shared by every form.

/// Postal code: exactly six ASCII digits
pub fn is_valid_pincode(value: &str) -> bool {
    let v = value.trim();
    v.len() == 6 && v.chars().all(|c| c.is_ascii_digit())
}

/// Ten-digit mobile number. Spaces and a leading +91 are tolerated.
pub fn is_valid_phone(value: &str) -> bool {
    normalize_phone(value).is_some()
}

/// Returns the bare 10 digits of a phone number
pub fn normalize_phone(value: &str) -> Option<String> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let digits = compact
        .strip_prefix("+91")
        .unwrap_or(compact.as_str())
        .to_string();
    if digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

pub fn is_valid_email(value: &str) -> bool {
    let v = value.trim();
    match v.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !v.contains(char::is_whitespace)
        }
        None => false,
    }
}

pub fn require_non_empty(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pincode() {
        assert!(is_valid_pincode("560001"));
        assert!(is_valid_pincode(" 110011 "));
        assert!(!is_valid_pincode("56001"));
        assert!(!is_valid_pincode("5600011"));
        assert!(!is_valid_pincode("56000a"));
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("+91 98765 43210"));
        assert_eq!(normalize_phone("98765-43210").as_deref(), Some("9876543210"));
        assert!(!is_valid_phone("987654321"));
        assert!(!is_valid_phone("98765432101"));
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("owner@store.in"));
        assert!(!is_valid_email("owner.store.in"));
        assert!(!is_valid_email("@store.in"));
        assert!(!is_valid_email("owner@store"));
        assert!(!is_valid_email("own er@store.in"));
    }
}
