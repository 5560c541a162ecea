use crate::error::{PaymentError, Result};
use crate::interfaces::api::{CardRequest, CreateOrderRequest, CreatePaymentRequest};
use serde::Deserialize;
use std::io::Read;

/// One checkout from the batch input: an order plus the payment attempted on it.
///
/// Empty cells deserialize to `None`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CheckoutRow {
    pub amount: i64,
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub method: Option<String>,
    pub vpa: Option<String>,
    pub card_number: Option<String>,
    pub expiry_month: Option<String>,
    pub expiry_year: Option<String>,
}

impl CheckoutRow {
    pub fn order_request(&self) -> CreateOrderRequest {
        CreateOrderRequest {
            amount: Some(self.amount),
            currency: self.currency.clone(),
            receipt: self.receipt.clone(),
            notes: None,
        }
    }

    /// Payment request against `order_id`. A card payload is sent only when at
    /// least one card column is filled in.
    pub fn payment_request(&self, order_id: &str) -> CreatePaymentRequest {
        let has_card =
            self.card_number.is_some() || self.expiry_month.is_some() || self.expiry_year.is_some();
        CreatePaymentRequest {
            order_id: Some(order_id.to_string()),
            method: self.method.clone(),
            vpa: self.vpa.clone(),
            card: has_card.then(|| CardRequest {
                number: self.card_number.clone(),
                expiry_month: self.expiry_month.clone(),
                expiry_year: self.expiry_year.clone(),
                ..Default::default()
            }),
        }
    }
}

/// Reads checkout rows from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and tolerating short rows.
pub struct CheckoutReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CheckoutReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes rows; a malformed row yields an error and reading continues.
    pub fn checkouts(self) -> impl Iterator<Item = Result<CheckoutRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "amount,currency,receipt,method,vpa,card_number,expiry_month,expiry_year";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\n500, INR, rcpt_1, upi, bob@upi,,,\n1000,,, card,, 4111 1111 1111 1111, 12, 30"
        );
        let rows: Vec<Result<CheckoutRow>> =
            CheckoutReader::new(data.as_bytes()).checkouts().collect();

        assert_eq!(rows.len(), 2);
        let upi = rows[0].as_ref().unwrap();
        assert_eq!(upi.amount, 500);
        assert_eq!(upi.vpa.as_deref(), Some("bob@upi"));
        assert!(upi.card_number.is_none());
        assert!(upi.payment_request("order_1").card.is_none());

        let card = rows[1].as_ref().unwrap();
        assert!(card.currency.is_none());
        let request = card.payment_request("order_2");
        let details = request.card.unwrap();
        assert_eq!(details.number.as_deref(), Some("4111 1111 1111 1111"));
        assert_eq!(details.expiry_year.as_deref(), Some("30"));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}\nlots,INR,,upi,bob@upi,,,\n200,INR,,upi,bob@upi,,,");
        let rows: Vec<Result<CheckoutRow>> =
            CheckoutReader::new(data.as_bytes()).checkouts().collect();

        assert!(rows[0].is_err());
        assert!(rows[1].is_ok());
    }
}
