//! CPF and CNPJ check-digit validation
//!
//! Both documents end in two check digits. Each is a weighted sum of the
//! digits before it, reduced mod 11: a remainder below 2 gives 0, anything
//! else gives `11 - remainder`.

use super::ValidationOutcome;

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Document {
    Cpf,
    Cnpj,
}

impl Document {
    fn label(self) -> &'static str {
        match self {
            Self::Cpf => "CPF",
            Self::Cnpj => "CNPJ",
        }
    }

    fn len(self) -> usize {
        match self {
            Self::Cpf => CPF_LEN,
            Self::Cnpj => CNPJ_LEN,
        }
    }

    /// Weights for the first and second check digit
    fn weights(self) -> (Vec<u32>, Vec<u32>) {
        match self {
            // 10 down to 2, then 11 down to 2
            Self::Cpf => ((2..=10).rev().collect(), (2..=11).rev().collect()),
            Self::Cnpj => (CNPJ_FIRST_WEIGHTS.to_vec(), CNPJ_SECOND_WEIGHTS.to_vec()),
        }
    }
}

/// Keeps only the ASCII digits of `input`.
#[must_use]
pub fn only_digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        0 | 1 => 0,
        remainder => 11 - remainder,
    }
}

fn validate(document: Document, input: &str) -> ValidationOutcome {
    let label = document.label();
    let digits: Vec<u32> = input.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != document.len() {
        return ValidationOutcome::invalid(format!("{label} must have {} digits", document.len()));
    }

    let invalid = || ValidationOutcome::invalid(format!("{label} is invalid"));

    if digits.windows(2).all(|pair| pair.first() == pair.last()) {
        return invalid();
    }

    let (first_weights, second_weights) = document.weights();
    let first = check_digit(&digits, &first_weights);
    let second = check_digit(&digits, &second_weights);

    let body = document.len() - 2;
    if digits.get(body) != Some(&first) || digits.get(body + 1) != Some(&second) {
        return invalid();
    }

    ValidationOutcome::valid(format!("{label} is valid"))
}

/// Appends both check digits to the first nine digits of a CPF and returns
/// it formatted. None unless `base` has exactly nine digits.
#[must_use]
pub fn complete_cpf(base: &str) -> Option<String> {
    let mut digits: Vec<u32> = base.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != CPF_LEN - 2 {
        return None;
    }
    let (first_weights, second_weights) = Document::Cpf.weights();
    digits.push(check_digit(&digits, &first_weights));
    digits.push(check_digit(&digits, &second_weights));

    let rendered: String = digits.iter().filter_map(|d| char::from_digit(*d, 10)).collect();
    format_cpf(&rendered)
}

/// Validates an 11-digit CPF. Punctuation is ignored.
#[must_use]
pub fn validate_cpf(input: &str) -> ValidationOutcome {
    validate(Document::Cpf, input)
}

/// Validates a 14-digit CNPJ. Punctuation is ignored.
#[must_use]
pub fn validate_cnpj(input: &str) -> ValidationOutcome {
    validate(Document::Cnpj, input)
}

fn punctuate(digits: &str, marks: &[(usize, char)]) -> String {
    let mut out = String::with_capacity(digits.len() + marks.len());
    for (i, c) in digits.chars().enumerate() {
        if let Some((_, mark)) = marks.iter().find(|(at, _)| *at == i) {
            out.push(*mark);
        }
        out.push(c);
    }
    out
}

/// Renders a CPF as `XXX.XXX.XXX-XX`; None unless it has 11 digits.
#[must_use]
pub fn format_cpf(input: &str) -> Option<String> {
    let digits = only_digits(input);
    (digits.len() == CPF_LEN).then(|| punctuate(&digits, &[(3, '.'), (6, '.'), (9, '-')]))
}

/// Renders a CNPJ as `XX.XXX.XXX/XXXX-XX`; None unless it has 14 digits.
#[must_use]
pub fn format_cnpj(input: &str) -> Option<String> {
    let digits = only_digits(input);
    (digits.len() == CNPJ_LEN)
        .then(|| punctuate(&digits, &[(2, '.'), (5, '.'), (8, '/'), (12, '-')]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_cpfs_validate() {
        assert_eq!(complete_cpf("529982247").as_deref(), Some("529.982.247-25"));
        assert_eq!(complete_cpf("123.456.789").as_deref(), Some("123.456.789-09"));
        assert!(complete_cpf("12345678").is_none());
    }

    #[test]
    fn repeated_digit_cpfs_are_invalid() {
        for digit in '0'..='9' {
            let cpf: String = std::iter::repeat(digit).take(11).collect();
            let outcome = validate_cpf(&cpf);
            assert!(!outcome.valid, "{cpf} should be rejected");
            assert_eq!(outcome.message, "CPF is invalid");
        }
    }

    #[test]
    fn known_cpf_is_valid_with_or_without_punctuation() {
        assert!(validate_cpf("123.456.789-09").valid);
        assert!(validate_cpf("12345678909").valid);
        assert_eq!(validate_cpf("123.456.789-09").message, "CPF is valid");
    }

    #[test]
    fn changing_either_cpf_check_digit_invalidates() {
        assert!(!validate_cpf("123.456.789-08").valid);
        assert!(!validate_cpf("123.456.789-19").valid);
    }

    #[test]
    fn cpf_length_is_checked_first() {
        let outcome = validate_cpf("123.456.789");
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "CPF must have 11 digits");
        assert!(!validate_cpf("").valid);
    }

    #[test]
    fn more_real_world_cpfs() {
        assert!(validate_cpf("529.982.247-25").valid);
        assert!(validate_cpf("111.444.777-35").valid);
        assert!(!validate_cpf("111.444.777-36").valid);
    }

    #[test]
    fn cnpj_check_digits() {
        assert!(validate_cnpj("12.345.678/0001-95").valid);
        assert!(validate_cnpj("11.222.333/0001-81").valid);
        assert!(!validate_cnpj("12.345.678/0001-90").valid);
        assert!(!validate_cnpj("12.345.678/0001-85").valid);
        assert!(!validate_cnpj("11.222.333/0001-82").valid);
    }

    #[test]
    fn cnpj_rejects_wrong_length_and_repeats() {
        assert_eq!(validate_cnpj("12.345.678/0001").message, "CNPJ must have 14 digits");
        assert_eq!(validate_cnpj("00000000000000").message, "CNPJ is invalid");
    }

    #[test]
    fn formats_documents() {
        assert_eq!(format_cpf("12345678909").as_deref(), Some("123.456.789-09"));
        assert_eq!(format_cpf("123.456.789-09").as_deref(), Some("123.456.789-09"));
        assert_eq!(format_cpf("1234"), None);
        assert_eq!(format_cnpj("12345678000195").as_deref(), Some("12.345.678/0001-95"));
    }

    #[test]
    fn formatted_cpf_punctuation_positions() {
        let formatted = format_cpf("52998224725").unwrap();
        let marks: Vec<(usize, char)> = formatted
            .char_indices()
            .filter(|(_, c)| !c.is_ascii_digit())
            .collect();
        assert_eq!(marks, vec![(3, '.'), (7, '.'), (11, '-')]);
    }

    #[test]
    fn only_digits_strips_everything_else() {
        assert_eq!(only_digits("CRM/SP 123.456"), "123456");
    }
}
