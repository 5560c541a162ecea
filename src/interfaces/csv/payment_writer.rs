use crate::error::Result;
use crate::interfaces::api::PaymentView;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct PaymentRecord<'a> {
    payment_id: &'a str,
    order_id: &'a str,
    amount: i64,
    currency: &'a str,
    method: &'static str,
    status: &'static str,
    vpa: Option<&'a str>,
    card_network: Option<&'static str>,
    card_last4: Option<&'a str>,
    error_code: Option<&'a str>,
}

impl<'a> From<&'a PaymentView> for PaymentRecord<'a> {
    fn from(view: &'a PaymentView) -> Self {
        Self {
            payment_id: &view.id,
            order_id: &view.order_id,
            amount: view.amount,
            currency: &view.currency,
            method: view.method.as_str(),
            status: view.status.as_str(),
            vpa: view.vpa.as_deref(),
            card_network: view.card_network.map(|n| n.as_str()),
            card_last4: view.card_last4.as_deref(),
            error_code: view.error_code.as_deref(),
        }
    }
}

/// Writes settled payments as CSV, one row per payment.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_payments<'a>(
        &mut self,
        payments: impl IntoIterator<Item = &'a PaymentView>,
    ) -> Result<()> {
        for payment in payments {
            self.writer.serialize(PaymentRecord::from(payment))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{CardNetwork, PaymentMethod, PaymentStatus};
    use chrono::Utc;

    fn view(id: &str, method: PaymentMethod, status: PaymentStatus) -> PaymentView {
        let now = Utc::now();
        PaymentView {
            id: id.to_string(),
            order_id: "order_1".to_string(),
            amount: 500,
            currency: "INR".to_string(),
            method,
            status,
            vpa: None,
            card_network: None,
            card_last4: None,
            error_code: None,
            error_description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_write_payments() {
        let mut upi = view("pay_1", PaymentMethod::Upi, PaymentStatus::Success);
        upi.vpa = Some("bob@upi".to_string());
        let mut card = view("pay_2", PaymentMethod::Card, PaymentStatus::Failed);
        card.card_network = Some(CardNetwork::Visa);
        card.card_last4 = Some("1111".to_string());
        card.error_code = Some("PAYMENT_FAILED".to_string());

        let mut out = Vec::new();
        let mut writer = PaymentWriter::new(&mut out);
        writer.write_payments([&upi, &card]).unwrap();
        drop(writer);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "payment_id,order_id,amount,currency,method,status,vpa,card_network,card_last4,error_code"
        );
        assert_eq!(lines[1], "pay_1,order_1,500,INR,upi,success,bob@upi,,,");
        assert_eq!(lines[2], "pay_2,order_1,500,INR,card,failed,,visa,1111,PAYMENT_FAILED");
    }
}
