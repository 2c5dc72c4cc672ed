//! # Customer Record
//!
//! Billing details sent alongside every authorization or sale.

use crate::record::{FieldMap, FieldValue, Record};

/// Fields required on every customer record
pub const CUSTOMER_FIELDS: &[&str] = &[
    "bill_name1",
    "bill_name2",
    "bill_street",
    "bill_zip",
    "bill_country",
    "bill_city",
    "bill_state",
    "cust_ip",
];

/// Billing customer
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    fields: FieldMap,
}

impl CustomerRecord {
    /// Create a customer with all fields declared and unset
    pub fn new() -> Self {
        Self {
            fields: FieldMap::declare(CUSTOMER_FIELDS),
        }
    }

    /// Builder: set first and last billing name
    pub fn with_name(self, first: impl Into<FieldValue>, last: impl Into<FieldValue>) -> Self {
        self.with("bill_name1", first).with("bill_name2", last)
    }

    /// Builder: set the billing address
    pub fn with_address(
        self,
        street: impl Into<FieldValue>,
        city: impl Into<FieldValue>,
        state: impl Into<FieldValue>,
        zip: impl Into<FieldValue>,
        country: impl Into<FieldValue>,
    ) -> Self {
        self.with("bill_street", street)
            .with("bill_city", city)
            .with("bill_state", state)
            .with("bill_zip", zip)
            .with("bill_country", country)
    }

    /// Builder: set the customer's IP address
    pub fn with_ip(self, ip: impl Into<FieldValue>) -> Self {
        self.with("cust_ip", ip)
    }
}

impl Default for CustomerRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for CustomerRecord {
    fn fields(&self) -> &FieldMap {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_fills_every_field() {
        let customer = CustomerRecord::new()
            .with_name("Ada", "Lovelace")
            .with_address("12 St James Sq", "London", "LND", "SW1Y", "GB")
            .with_ip("203.0.113.7");

        let flat = customer.flatten().unwrap();
        assert_eq!(flat.len(), CUSTOMER_FIELDS.len());
        assert_eq!(flat.get_str("bill_city").as_deref(), Some("London"));
        assert_eq!(flat.keys().collect::<Vec<_>>(), CUSTOMER_FIELDS);
    }

    #[test]
    fn test_missing_ip_is_reported() {
        let customer = CustomerRecord::new()
            .with_name("Ada", "Lovelace")
            .with_address("12 St James Sq", "London", "LND", "SW1Y", "GB");

        let err = customer.flatten().unwrap_err();
        assert_eq!(err.field(), Some("cust_ip"));
    }

    #[test]
    fn test_bind_overwrites() {
        let mut customer = CustomerRecord::new();
        customer.bind([("bill_name1", "Ada"), ("bill_name1", "Grace")]);
        assert_eq!(customer.fields().get_str("bill_name1").as_deref(), Some("Grace"));
    }
}
