use super::ValidationOutcome;

const MIN_LENGTH: usize = 8;

/// Characters accepted as the required special symbol
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Checks password strength; the first broken rule is reported.
#[must_use]
pub fn validate_password_strength(password: &str) -> ValidationOutcome {
    let rules: [(fn(&str) -> bool, &str); 5] = [
        (
            |p| p.chars().count() >= MIN_LENGTH,
            "Password must be at least 8 characters long",
        ),
        (
            |p| p.chars().any(|c| c.is_ascii_uppercase()),
            "Password must contain at least one uppercase letter",
        ),
        (
            |p| p.chars().any(|c| c.is_ascii_lowercase()),
            "Password must contain at least one lowercase letter",
        ),
        (
            |p| p.chars().any(|c| c.is_ascii_digit()),
            "Password must contain at least one number",
        ),
        (
            |p| p.chars().any(|c| SPECIAL_CHARACTERS.contains(c)),
            "Password must contain at least one special character",
        ),
    ];

    rules
        .iter()
        .find(|(rule, _)| !rule(password))
        .map_or_else(
            || ValidationOutcome::valid("Password is strong"),
            |(_, message)| ValidationOutcome::invalid(*message),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_passes() {
        let outcome = validate_password_strength("Admin@123");
        assert!(outcome.valid);
        assert_eq!(outcome.message, "Password is strong");
    }

    #[test]
    fn length_is_reported_before_other_rules() {
        assert_eq!(
            validate_password_strength("abc").message,
            "Password must be at least 8 characters long"
        );
        let outcome = validate_password_strength("Ab1!xyz");
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "Password must be at least 8 characters long");
    }

    #[test]
    fn patient_sample_password_is_strong() {
        assert!(validate_password_strength("Paciente123!").valid);
    }

    #[test]
    fn each_missing_class_is_reported() {
        assert_eq!(
            validate_password_strength("admin@123").message,
            "Password must contain at least one uppercase letter"
        );
        assert_eq!(
            validate_password_strength("ADMIN@123").message,
            "Password must contain at least one lowercase letter"
        );
        assert_eq!(
            validate_password_strength("Admin@abc").message,
            "Password must contain at least one number"
        );
        assert_eq!(
            validate_password_strength("Admin1234").message,
            "Password must contain at least one special character"
        );
    }

    #[test]
    fn symbols_outside_the_set_do_not_count() {
        assert!(!validate_password_strength("Admin_1234").valid);
        assert!(validate_password_strength("Admin{1234").valid);
    }
}
