//! End-to-end extraction over receipt-shaped text.

use std::str::FromStr;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use recibo_core::receipt::rules::classify_institution;
use recibo_core::{extract, FieldKey, InstitutionType, ReceiptParser, ReceiptRecord};

const ITAU_RECEIPT: &str = "Comprovante de Pix
Valor R$ 50,00
Tipo de transferência Pix

Destino Carla Mendes
Nome Ribeiro CNPJ 12.345.678/0001-99
BANCO ITAÚ UNIBANCO S.A.
Agência 1234
Conta 00056789-0
Tipo de conta Conta corrente

ID da transação: E60701190202405101230abcdEFGH12345678
";

#[test]
fn test_unlabelled_text_yields_empty_record() {
    let record = extract("Obrigado por usar nosso aplicativo!\nAtendimento 24h");
    assert_eq!(record, ReceiptRecord::default());
    assert!(record.extraction_error.is_none());
}

#[test]
fn test_empty_text_yields_empty_record() {
    let record = extract("");
    assert!(record.is_empty());
    assert_eq!(serde_json::to_string(&record).unwrap(), "{}");
}

#[test]
fn test_amounts() {
    assert_eq!(
        extract("Valor R$ 1.234,56").amount,
        Some(Decimal::from_str("1234.56").unwrap())
    );
    assert_eq!(
        extract("Valor R$ 50,00").amount,
        Some(Decimal::from_str("50.00").unwrap())
    );
}

#[test]
fn test_name_assembly() {
    let record = extract("Destino João Silva\nNome Pereira CNPJ 12.345.678/0001-99");
    assert_eq!(record.recipient_name.as_deref(), Some("João Silva Pereira"));

    let record = extract("Nome Maria Souza");
    assert_eq!(record.recipient_name.as_deref(), Some("Maria Souza"));
}

#[test]
fn test_institution_classification() {
    assert_eq!(
        classify_institution("BCO MERCADO PAGO IP", "BCO MERCADO PAGO IP"),
        InstitutionType::PaymentInstitution
    );
    assert_eq!(
        classify_institution("BANCO ITAÚ", "BANCO ITAÚ"),
        InstitutionType::Bank
    );

    let record = extract("Instituição\nBCO MERCADO PAGO IP");
    assert_eq!(record.institution.as_deref(), Some("BCO MERCADO PAGO IP"));
    assert_eq!(record.institution_type, Some(InstitutionType::PaymentInstitution));
}

#[test]
fn test_transaction_id_floor() {
    let id = "E0000000020240101000000ab-cd-efgh";
    assert_eq!(id.len(), 33);
    let record = extract(&format!("ID da transação: {}", id));
    assert_eq!(record.transaction_id.as_deref(), Some(id));

    let record = extract("ID da transação: ABCDEFGHIJ-123456789");
    assert_eq!(record.transaction_id, None);
}

#[test]
fn test_full_receipt() {
    let record = extract(ITAU_RECEIPT);

    let expected = ReceiptRecord {
        amount: Some(Decimal::from_str("50.00").unwrap()),
        recipient_name: Some("Carla Mendes Ribeiro".to_string()),
        institution: Some("BANCO ITAÚ UNIBANCO S.A.".to_string()),
        institution_type: Some(InstitutionType::Bank),
        branch: Some("1234".to_string()),
        account: Some("00056789-0".to_string()),
        account_type: Some("Conta corrente".to_string()),
        transaction_id: Some("E60701190202405101230abcdEFGH12345678".to_string()),
        extraction_error: None,
    };
    assert_eq!(record, expected);
}

#[test]
fn test_serialized_keys() {
    let json = serde_json::to_value(extract(ITAU_RECEIPT)).unwrap();
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort();

    let mut expected: Vec<&str> = FieldKey::ALL.iter().map(FieldKey::as_str).collect();
    expected.sort();

    assert_eq!(keys, expected);
    assert_eq!(json["tipo_instituicao"], "Banco");
    assert_eq!(json["valor"], serde_json::json!(50.0));
}

#[test]
fn test_idempotent() {
    assert_eq!(extract(ITAU_RECEIPT), extract(ITAU_RECEIPT));

    let parser = ReceiptParser::new();
    assert_eq!(parser.parse(ITAU_RECEIPT), parser.parse(ITAU_RECEIPT));
}

#[test]
fn test_degraded_record_keeps_fields() {
    let text = ITAU_RECEIPT.replace("R$ 50,00", "R$ 50,00,0");
    let record = extract(&text);

    assert_eq!(record.amount, None);
    assert_eq!(record.branch.as_deref(), Some("1234"));
    assert_eq!(record.recipient_name.as_deref(), Some("Carla Mendes Ribeiro"));

    let json = serde_json::to_value(&record).unwrap();
    assert!(json["erro_extracao"].as_str().unwrap().contains("50,00,0"));
}

#[test]
fn test_parallel_calls_are_independent() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let text = format!("Agência {:04}\nValor R$ {},00", 1000 + i, i);
                extract(&text)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let record = handle.join().unwrap();
        assert_eq!(record.branch, Some(format!("{:04}", 1000 + i)));
        assert_eq!(record.amount, Some(Decimal::from(i as i64)));
    }
}
