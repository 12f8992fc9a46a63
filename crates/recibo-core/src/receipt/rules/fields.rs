//! Labelled text fields: branch, account, account type, transaction id.
//!
//! Each field is a row in [`TEXT_FIELD_RULES`]. Adding a field means adding a
//! pattern and a row, not another branch in the parser.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::receipt::FieldKey;

use super::patterns::{
    ACCOUNT_PATTERN, ACCOUNT_TYPE_PATTERN, BRANCH_PATTERN, TRANSACTION_ID_PATTERN,
};
use super::{collapse_whitespace, FieldCandidate, FieldExtractor, FieldOutcome};

/// Post-match cleanup applied to the captured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    /// Trim surrounding whitespace.
    Trim,
    /// Collapse internal whitespace runs and trim.
    CollapseWhitespace,
    /// Keep the capture as-is.
    Verbatim,
}

impl Normalize {
    pub fn apply(&self, raw: &str) -> String {
        match self {
            Normalize::Trim => raw.trim().to_string(),
            Normalize::CollapseWhitespace => collapse_whitespace(raw),
            Normalize::Verbatim => raw.to_string(),
        }
    }
}

/// A single labelled field: record key, pattern (value in group 1), cleanup.
#[derive(Debug)]
pub struct TextFieldRule {
    pub key: FieldKey,
    pub pattern: &'static Regex,
    pub normalize: Normalize,
}

lazy_static! {
    pub static ref TEXT_FIELD_RULES: Vec<TextFieldRule> = vec![
        TextFieldRule {
            key: FieldKey::Branch,
            pattern: &BRANCH_PATTERN,
            normalize: Normalize::Trim,
        },
        TextFieldRule {
            key: FieldKey::Account,
            pattern: &ACCOUNT_PATTERN,
            normalize: Normalize::Trim,
        },
        TextFieldRule {
            key: FieldKey::AccountType,
            pattern: &ACCOUNT_TYPE_PATTERN,
            normalize: Normalize::Trim,
        },
        TextFieldRule {
            key: FieldKey::TransactionId,
            pattern: &TRANSACTION_ID_PATTERN,
            normalize: Normalize::Verbatim,
        },
    ];
}

impl TextFieldRule {
    /// Find the rule for a record key, if that key is a labelled text field.
    pub fn for_key(key: FieldKey) -> Option<&'static TextFieldRule> {
        TEXT_FIELD_RULES.iter().find(|rule| rule.key == key)
    }
}

impl FieldExtractor for TextFieldRule {
    type Output = String;

    fn key(&self) -> FieldKey {
        self.key
    }

    fn locate(&self, text: &str) -> FieldOutcome<String> {
        let Some(caps) = self.pattern.captures(text) else {
            return Ok(None);
        };
        let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
            return Ok(None);
        };

        let value = self.normalize.apply(value.as_str());
        if value.is_empty() {
            return Ok(None);
        }

        Ok(Some(FieldCandidate::new(
            value,
            whole.as_str(),
            whole.start(),
            whole.end(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(key: FieldKey, text: &str) -> Option<String> {
        TextFieldRule::for_key(key)
            .unwrap()
            .locate(text)
            .unwrap()
            .map(|c| c.value)
    }

    #[test]
    fn test_branch() {
        assert_eq!(locate(FieldKey::Branch, "Agência 0001"), Some("0001".into()));
        assert_eq!(locate(FieldKey::Branch, "AGENCIA: 1234"), Some("1234".into()));
        assert_eq!(locate(FieldKey::Branch, "agência\n56789"), Some("56789".into()));
        assert_eq!(locate(FieldKey::Branch, "Agência 12"), None);
    }

    #[test]
    fn test_account() {
        assert_eq!(locate(FieldKey::Account, "Conta 12345-6"), Some("12345-6".into()));
        assert_eq!(
            locate(FieldKey::Account, "Tipo de conta\nCorrente\nConta: 998877-0"),
            Some("998877-0".into())
        );
        assert_eq!(locate(FieldKey::Account, "Conta corrente"), None);
        assert_eq!(locate(FieldKey::Account, "Conta - Corrente"), None);
    }

    #[test]
    fn test_account_type() {
        assert_eq!(
            locate(FieldKey::AccountType, "Tipo de conta   Conta corrente  \nAgência 0001"),
            Some("Conta corrente".into())
        );
        assert_eq!(
            locate(FieldKey::AccountType, "TIPO DE CONTA: Poupança"),
            Some("Poupança".into())
        );
    }

    #[test]
    fn test_transaction_id_length_floor() {
        let id = "E1234567820240101120000abcdEF-12";
        assert_eq!(id.len(), 32);
        assert_eq!(
            locate(FieldKey::TransactionId, &format!("ID da transação: {}", id)),
            Some(id.to_string())
        );

        let short = "E1234567-89012345678";
        assert_eq!(short.len(), 20);
        assert_eq!(
            locate(FieldKey::TransactionId, &format!("ID da transação: {}", short)),
            None
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(Normalize::Trim.apply("  a  b "), "a  b");
        assert_eq!(Normalize::CollapseWhitespace.apply("  a  b "), "a b");
        assert_eq!(Normalize::Verbatim.apply(" a "), " a ");
    }

    #[test]
    fn test_rules_cover_distinct_keys() {
        let mut keys: Vec<_> = TEXT_FIELD_RULES.iter().map(|r| r.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), TEXT_FIELD_RULES.len());
    }
}
