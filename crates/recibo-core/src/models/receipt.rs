//! Receipt data models.
//!
//! Serialized keys follow the Portuguese field names consumers of the
//! extraction output already rely on (`valor`, `destino_nome`, ...).

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured data extracted from one transfer receipt.
///
/// Every populated field was matched in the source text. A `None` field
/// means "not found"; it is never used for "found but empty".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// Transferred amount.
    #[serde(
        rename = "valor",
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,

    /// Recipient name, assembled from the "Destino" and "Nome" lines.
    #[serde(rename = "destino_nome", skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,

    /// Receiving institution as printed on the receipt.
    #[serde(rename = "destino_instituicao", skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,

    /// Coarse classification of the receiving institution.
    #[serde(rename = "tipo_instituicao", skip_serializing_if = "Option::is_none")]
    pub institution_type: Option<InstitutionType>,

    /// Branch number (3-5 digits).
    #[serde(rename = "destino_agencia", skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Account number (digits and hyphens).
    #[serde(rename = "destino_conta", skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Account type, e.g. "Conta corrente".
    #[serde(rename = "destino_tipo_conta", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,

    /// Transaction identifier (at least 30 characters).
    #[serde(rename = "id_transacao", skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    /// Diagnostic note for a degraded (not failed) extraction.
    #[serde(rename = "erro_extracao", skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

impl ReceiptRecord {
    /// True when no field was found and no error was recorded.
    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty() && self.extraction_error.is_none()
    }

    /// Keys of the fields that were found, in record order.
    pub fn present_fields(&self) -> Vec<FieldKey> {
        FieldKey::ALL
            .iter()
            .copied()
            .filter(|key| self.has(*key))
            .collect()
    }

    /// Keys of the fields that were not found, in record order.
    pub fn missing_fields(&self) -> Vec<FieldKey> {
        FieldKey::ALL
            .iter()
            .copied()
            .filter(|key| !self.has(*key))
            .collect()
    }

    /// Whether the given field was found.
    pub fn has(&self, key: FieldKey) -> bool {
        match key {
            FieldKey::Amount => self.amount.is_some(),
            FieldKey::RecipientName => self.recipient_name.is_some(),
            FieldKey::Institution => self.institution.is_some(),
            FieldKey::InstitutionType => self.institution_type.is_some(),
            FieldKey::Branch => self.branch.is_some(),
            FieldKey::Account => self.account.is_some(),
            FieldKey::AccountType => self.account_type.is_some(),
            FieldKey::TransactionId => self.transaction_id.is_some(),
        }
    }

    /// Store a string value under the given text field key.
    ///
    /// Keys that do not hold free text (`valor`, `tipo_instituicao`) are ignored.
    pub fn set_text(&mut self, key: FieldKey, value: String) {
        let slot = match key {
            FieldKey::RecipientName => &mut self.recipient_name,
            FieldKey::Institution => &mut self.institution,
            FieldKey::Branch => &mut self.branch,
            FieldKey::Account => &mut self.account,
            FieldKey::AccountType => &mut self.account_type,
            FieldKey::TransactionId => &mut self.transaction_id,
            FieldKey::Amount | FieldKey::InstitutionType => return,
        };
        *slot = Some(value);
    }
}

/// Every key a [`ReceiptRecord`] can carry, apart from `erro_extracao`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    #[serde(rename = "valor")]
    Amount,
    #[serde(rename = "destino_nome")]
    RecipientName,
    #[serde(rename = "destino_instituicao")]
    Institution,
    #[serde(rename = "tipo_instituicao")]
    InstitutionType,
    #[serde(rename = "destino_agencia")]
    Branch,
    #[serde(rename = "destino_conta")]
    Account,
    #[serde(rename = "destino_tipo_conta")]
    AccountType,
    #[serde(rename = "id_transacao")]
    TransactionId,
}

impl FieldKey {
    pub const ALL: [FieldKey; 8] = [
        FieldKey::Amount,
        FieldKey::RecipientName,
        FieldKey::Institution,
        FieldKey::InstitutionType,
        FieldKey::Branch,
        FieldKey::Account,
        FieldKey::AccountType,
        FieldKey::TransactionId,
    ];

    /// Serialized record key.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Amount => "valor",
            FieldKey::RecipientName => "destino_nome",
            FieldKey::Institution => "destino_instituicao",
            FieldKey::InstitutionType => "tipo_instituicao",
            FieldKey::Branch => "destino_agencia",
            FieldKey::Account => "destino_conta",
            FieldKey::AccountType => "destino_tipo_conta",
            FieldKey::TransactionId => "id_transacao",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of the receiving institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstitutionType {
    /// Bank (banco).
    #[serde(rename = "Banco")]
    Bank,
    /// Payment institution (instituição de pagamento).
    #[serde(rename = "Instituição de Pagamento")]
    PaymentInstitution,
    /// Anything else.
    #[serde(rename = "Outro")]
    Other,
}

impl InstitutionType {
    /// Display label used in the serialized record.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstitutionType::Bank => "Banco",
            InstitutionType::PaymentInstitution => "Instituição de Pagamento",
            InstitutionType::Other => "Outro",
        }
    }
}

impl fmt::Display for InstitutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope returned to callers that submitted an image or text.
///
/// Mirrors the response body of the upload endpoint the engine was first
/// exposed through: either the extracted data with the recognized text, or
/// an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResponse {
    Success {
        success: bool,
        dados_extraidos: ReceiptRecord,
        #[serde(skip_serializing_if = "Option::is_none")]
        ocr_text: Option<String>,
    },
    Failure {
        success: bool,
        error: String,
    },
}

impl ExtractionResponse {
    pub fn success(record: ReceiptRecord, ocr_text: Option<String>) -> Self {
        Self::Success {
            success: true,
            dados_extraidos: record,
            ocr_text,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            success: false,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_empty_record_serializes_to_empty_object() {
        let record = ReceiptRecord::default();
        assert!(record.is_empty());
        assert_eq!(serde_json::to_string(&record).unwrap(), "{}");
    }

    #[test]
    fn test_record_uses_portuguese_keys() {
        let record = ReceiptRecord {
            amount: Some(Decimal::from_str("1234.56").unwrap()),
            institution_type: Some(InstitutionType::PaymentInstitution),
            branch: Some("0001".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["valor"], serde_json::json!(1234.56));
        assert_eq!(json["tipo_instituicao"], "Instituição de Pagamento");
        assert_eq!(json["destino_agencia"], "0001");
        assert!(json.get("destino_nome").is_none());
        assert!(json.get("erro_extracao").is_none());
    }

    #[test]
    fn test_present_and_missing_fields() {
        let mut record = ReceiptRecord::default();
        record.set_text(FieldKey::Account, "12345-6".to_string());
        record.set_text(FieldKey::Amount, "ignored".to_string());

        assert_eq!(record.present_fields(), vec![FieldKey::Account]);
        assert_eq!(record.missing_fields().len(), 7);
        assert!(!record.has(FieldKey::Amount));
    }

    #[test]
    fn test_response_envelope() {
        let response = ExtractionResponse::success(ReceiptRecord::default(), Some("abc".into()));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["ocr_text"], "abc");
        assert!(json["dados_extraidos"].as_object().unwrap().is_empty());

        let failure = ExtractionResponse::failure("Nenhuma imagem foi enviada");
        assert!(!failure.is_success());
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["success"], false);
    }
}
