use super::document::only_digits;
use super::ValidationOutcome;

/// Validates a CRM/COREN registration: 5 to 10 digits once punctuation and
/// state prefixes are stripped.
#[must_use]
pub fn validate_license_number(input: &str) -> ValidationOutcome {
    let digits = only_digits(input);
    if (5..=10).contains(&digits.len()) {
        ValidationOutcome::valid("CRM/COREN is valid")
    } else {
        ValidationOutcome::invalid("CRM/COREN must have between 5 and 10 digits")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_count_bounds() {
        assert!(!validate_license_number("CRM 123").valid);
        assert!(!validate_license_number("1234").valid);
        assert!(validate_license_number("12345").valid);
        assert!(validate_license_number("1234567890").valid);
        assert!(!validate_license_number("12345678901").valid);
    }

    #[test]
    fn punctuation_is_ignored() {
        let outcome = validate_license_number("CRM/SP 123.456");
        assert!(outcome.valid);
        assert_eq!(outcome.message, "CRM/COREN is valid");
        assert_eq!(
            validate_license_number("CRM-12").message,
            "CRM/COREN must have between 5 and 10 digits"
        );
    }
}
