use lazy_static::lazy_static;
use regex::Regex;

use super::ValidationOutcome;

#[allow(clippy::expect_used)]
mod patterns {
    use super::{lazy_static, Regex};

    lazy_static! {
        pub static ref EMAIL: Regex =
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex");
    }
}

#[must_use]
pub fn validate_email(email: &str) -> ValidationOutcome {
    if patterns::EMAIL.is_match(email.trim()) {
        ValidationOutcome::valid("Email is valid")
    } else {
        ValidationOutcome::invalid("Email format is invalid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        assert!(validate_email("admin@vidaplus.com").valid);
        assert!(validate_email("maria.silva+consulta@hospital.org.br").valid);
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "maria", "maria@", "@vidaplus.com", "maria@vidaplus", "maria@vidaplus.c"] {
            let outcome = validate_email(email);
            assert!(!outcome.valid, "{email:?} should be rejected");
            assert_eq!(outcome.message, "Email format is invalid");
        }
    }
}
