use base64::{engine::general_purpose, Engine as _};
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

#[allow(clippy::expect_used)]
mod patterns {
    use lazy_static::lazy_static;
    use regex::Regex;

    // Literal patterns, compiled once.
    lazy_static! {
        pub(super) static ref CNPJ: Regex =
            Regex::new(r"\b\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2}\b").expect("CNPJ pattern");
        pub(super) static ref CPF: Regex =
            Regex::new(r"\b\d{3}\.?\d{3}\.?\d{3}-?\d{2}\b").expect("CPF pattern");
        pub(super) static ref EMAIL: Regex =
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern");
        pub(super) static ref PHONE: Regex =
            Regex::new(r"(?:\+55\s?)?(?:\(\d{2}\)|\b\d{2})\s?9?\d{4}-\d{4}\b").expect("phone pattern");
        pub(super) static ref IP: Regex =
            Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").expect("IP pattern");
    }
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_documents: bool,
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_ip_addresses: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_documents: true,
            redact_emails: true,
            redact_phones: true,
            redact_ip_addresses: false,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

/// PII redactor for log messages
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    #[must_use]
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        // CNPJ first: its 14 digits would otherwise half-match as a CPF.
        if self.config.redact_documents {
            result = self.replace(&patterns::CNPJ, &result, "CNPJ", "**.***.***/****-**");
            result = self.replace(&patterns::CPF, &result, "CPF", "***.***.***-**");
        }

        if self.config.redact_emails {
            result = self.redact_emails(&result);
        }

        if self.config.redact_phones {
            result = self.replace(&patterns::PHONE, &result, "PHONE", "(**) *****-****");
        }

        if self.config.redact_ip_addresses {
            result = self.replace(&patterns::IP, &result, "IP", "***.***.***.***");
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).into_owned();
        }

        result
    }

    fn replace(&self, pattern: &Regex, text: &str, label: &str, mask: &str) -> String {
        pattern
            .replace_all(text, |caps: &Captures| {
                if self.config.hash_for_correlation {
                    format!("{label}[{}]", hash_value(matched(caps)))
                } else {
                    mask.to_string()
                }
            })
            .into_owned()
    }

    fn redact_emails(&self, text: &str) -> String {
        patterns::EMAIL
            .replace_all(text, |caps: &Captures| {
                let email = matched(caps);
                if self.config.hash_for_correlation {
                    return format!("EMAIL[{}]", hash_value(email));
                }
                match email.split_once('@') {
                    Some((user, domain)) => format!(
                        "{}***@{}***",
                        user.chars().next().unwrap_or('*'),
                        domain.chars().next().unwrap_or('*')
                    ),
                    None => "***@***".to_string(),
                }
            })
            .into_owned()
    }
}

fn matched<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(0).map_or("", |m| m.as_str())
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    // Six bytes keep the token short while still correlating.
    let prefix: Vec<u8> = digest.iter().take(6).copied().collect();
    general_purpose::URL_SAFE_NO_PAD.encode(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masking() -> PiiRedactor {
        PiiRedactor::new(RedactionConfig {
            hash_for_correlation: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_email_redaction() {
        let redacted = masking().redact("User maria.silva@example.com logged in");
        assert!(redacted.contains("m***@e***"));
        assert!(!redacted.contains("maria.silva"));
    }

    #[test]
    fn test_cpf_redaction_formatted_and_bare() {
        let redactor = masking();
        assert_eq!(redactor.redact("cpf=123.456.789-09"), "cpf=***.***.***-**");
        assert_eq!(redactor.redact("cpf=12345678909"), "cpf=***.***.***-**");
    }

    #[test]
    fn test_cnpj_is_not_mistaken_for_cpf() {
        let redacted = masking().redact("facility 12.345.678/0001-95 seeded");
        assert_eq!(redacted, "facility **.***.***/****-** seeded");
    }

    #[test]
    fn test_phone_redaction() {
        let redacted = masking().redact("Call me at (11) 98765-4321");
        assert!(redacted.contains("(**) *****-****"));
        assert!(!redacted.contains("98765"));
    }

    #[test]
    fn test_hashes_correlate() {
        let redactor = PiiRedactor::default();
        let first = redactor.redact("login maria@example.com");
        let second = redactor.redact("logout maria@example.com");
        let token = first.trim_start_matches("login ");
        assert!(token.starts_with("EMAIL["));
        assert!(second.ends_with(token));
    }

    #[test]
    fn test_plain_text_untouched() {
        let text = "GET /api/v1/patients/42 completed in 12ms";
        assert_eq!(PiiRedactor::default().redact(text), text);
    }

    #[test]
    fn test_ip_redaction_is_opt_in() {
        let text = "origin 10.0.0.7";
        assert_eq!(PiiRedactor::default().redact(text), text);

        let redactor = PiiRedactor::new(RedactionConfig {
            redact_ip_addresses: true,
            hash_for_correlation: false,
            ..Default::default()
        });
        assert_eq!(redactor.redact(text), "origin ***.***.***.***");
    }
}
