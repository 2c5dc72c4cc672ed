//! # Payment Records
//!
//! Payment instruments accepted by the gateway. All card payments share
//! the `pay_type = "C"` discriminant; a recurring card payment is the card
//! field set plus the recurring schedule.

use crate::record::{FieldMap, FieldValue, Record};

/// Discriminant sent for every card payment
pub const CARD_PAY_TYPE: &str = "C";

/// Fields required on every card payment
pub const CARD_FIELDS: &[&str] = &["pay_type", "amount", "card_number", "card_expire", "cvv2"];

/// Additional fields required on a recurring card payment
pub const RECURRING_FIELDS: &[&str] = &["recurring_amount", "recurring_period", "recurring_count"];

/// One-off credit card payment
#[derive(Debug, Clone, PartialEq)]
pub struct CardPayment {
    fields: FieldMap,
}

impl CardPayment {
    /// Create an empty card payment with `pay_type` preset
    pub fn new() -> Self {
        let mut fields = FieldMap::declare(CARD_FIELDS);
        fields.insert("pay_type", CARD_PAY_TYPE);
        Self { fields }
    }

    /// Builder: set the charge amount
    pub fn with_amount(self, amount: impl Into<FieldValue>) -> Self {
        self.with("amount", amount)
    }

    /// Builder: set the card number
    pub fn with_card_number(self, number: impl Into<FieldValue>) -> Self {
        self.with("card_number", number)
    }

    /// Builder: set the expiry (gateway format, e.g. `"1228"`)
    pub fn with_card_expire(self, expire: impl Into<FieldValue>) -> Self {
        self.with("card_expire", expire)
    }

    /// Builder: set the card security code
    pub fn with_cvv2(self, cvv2: impl Into<FieldValue>) -> Self {
        self.with("cvv2", cvv2)
    }

    pub fn pay_type(&self) -> Option<&FieldValue> {
        self.fields.get("pay_type")
    }
}

impl Default for CardPayment {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for CardPayment {
    fn fields(&self) -> &FieldMap {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.fields
    }
}

/// Card payment with a recurring billing schedule
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringCardPayment {
    fields: FieldMap,
}

impl RecurringCardPayment {
    /// Create an empty recurring payment with `pay_type` preset
    pub fn new() -> Self {
        Self::from_card(CardPayment::new())
    }

    /// Extend an existing card payment with the recurring fields
    pub fn from_card(card: CardPayment) -> Self {
        let mut fields = card.fields;
        for name in RECURRING_FIELDS {
            if !fields.contains_key(name) {
                fields.insert(*name, FieldValue::Null);
            }
        }
        Self { fields }
    }

    pub fn with_amount(self, amount: impl Into<FieldValue>) -> Self {
        self.with("amount", amount)
    }

    pub fn with_card_number(self, number: impl Into<FieldValue>) -> Self {
        self.with("card_number", number)
    }

    pub fn with_card_expire(self, expire: impl Into<FieldValue>) -> Self {
        self.with("card_expire", expire)
    }

    pub fn with_cvv2(self, cvv2: impl Into<FieldValue>) -> Self {
        self.with("cvv2", cvv2)
    }

    /// Builder: set the amount charged on each recurrence
    pub fn with_recurring_amount(self, amount: impl Into<FieldValue>) -> Self {
        self.with("recurring_amount", amount)
    }

    /// Builder: set the recurrence period (gateway-defined code)
    pub fn with_recurring_period(self, period: impl Into<FieldValue>) -> Self {
        self.with("recurring_period", period)
    }

    /// Builder: set how many times the charge recurs
    pub fn with_recurring_count(self, count: impl Into<FieldValue>) -> Self {
        self.with("recurring_count", count)
    }

    pub fn pay_type(&self) -> Option<&FieldValue> {
        self.fields.get("pay_type")
    }
}

impl Default for RecurringCardPayment {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for RecurringCardPayment {
    fn fields(&self) -> &FieldMap {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.fields
    }
}

/// Closed set of payment instruments the client can send
#[derive(Debug, Clone, PartialEq)]
pub enum Payment {
    Card(CardPayment),
    RecurringCard(RecurringCardPayment),
}

impl Payment {
    /// Stable name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Payment::Card(_) => "card",
            Payment::RecurringCard(_) => "recurring_card",
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, Payment::RecurringCard(_))
    }
}

impl Record for Payment {
    fn fields(&self) -> &FieldMap {
        match self {
            Payment::Card(p) => p.fields(),
            Payment::RecurringCard(p) => p.fields(),
        }
    }

    fn fields_mut(&mut self) -> &mut FieldMap {
        match self {
            Payment::Card(p) => p.fields_mut(),
            Payment::RecurringCard(p) => p.fields_mut(),
        }
    }
}

impl From<CardPayment> for Payment {
    fn from(payment: CardPayment) -> Self {
        Payment::Card(payment)
    }
}

impl From<RecurringCardPayment> for Payment {
    fn from(payment: RecurringCardPayment) -> Self {
        Payment::RecurringCard(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayError;

    fn card() -> CardPayment {
        CardPayment::new()
            .with_amount("10.00")
            .with_card_number("4111111111111111")
            .with_card_expire("1228")
            .with_cvv2("123")
    }

    #[test]
    fn test_card_defaults_pay_type() {
        let payment = CardPayment::new();
        assert_eq!(payment.pay_type(), Some(&FieldValue::from("C")));
        assert_eq!(payment.fields().keys().collect::<Vec<_>>(), CARD_FIELDS);
    }

    #[test]
    fn test_recurring_inherits_card_fields() {
        let payment = RecurringCardPayment::new();
        assert_eq!(payment.pay_type(), Some(&FieldValue::from("C")));

        let keys: Vec<_> = payment.fields().keys().collect();
        let expected: Vec<_> = CARD_FIELDS.iter().chain(RECURRING_FIELDS).copied().collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_empty_card_fails_on_first_unset_field() {
        let err = CardPayment::new().flatten().unwrap_err();
        assert!(matches!(err, GatewayError::Validation { ref field } if field == "amount"));
    }

    #[test]
    fn test_populated_card_flattens() {
        let flat = card().flatten().unwrap();
        assert_eq!(flat.get_str("pay_type").as_deref(), Some("C"));
        assert_eq!(flat.get_str("cvv2").as_deref(), Some("123"));
    }

    #[test]
    fn test_recurring_from_card_requires_schedule() {
        let recurring = RecurringCardPayment::from_card(card());
        let err = recurring.flatten().unwrap_err();
        assert_eq!(err.field(), Some("recurring_amount"));

        let recurring = recurring
            .with_recurring_amount("10.00")
            .with_recurring_period("M")
            .with_recurring_count(12);
        let flat = recurring.flatten().unwrap();
        assert_eq!(flat.get_str("recurring_count").as_deref(), Some("12"));
        assert_eq!(flat.len(), CARD_FIELDS.len() + RECURRING_FIELDS.len());
    }

    #[test]
    fn test_payment_kind() {
        let one_off = Payment::from(card());
        let recurring = Payment::from(RecurringCardPayment::new());

        assert_eq!(one_off.kind(), "card");
        assert!(!one_off.is_recurring());
        assert_eq!(recurring.kind(), "recurring_card");
        assert!(recurring.is_recurring());
    }

    #[test]
    fn test_zero_amount_policy() {
        let payment = card().with_amount(0);
        assert!(payment.flatten().is_err());
        assert!(payment
            .flatten_with(crate::Emptiness::AllowZero)
            .is_ok());
    }
}
