//! Shipping address and its format rules.

use serde::{Deserialize, Serialize};
use wholesale_core::error::{DomainError, FieldViolation};

/// Where an order ships to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingAddress {
    /// Recipient name.
    pub full_name: String,
    /// Ten-digit mobile number.
    pub phone: String,
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Six-digit postal code.
    pub postal_code: String,
}

impl ShippingAddress {
    /// Trims every field and checks them all, reporting every violation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationFailed` listing each bad field.
    pub fn validated(&self) -> Result<Self, DomainError> {
        let address = Self {
            full_name: self.full_name.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            street: self.street.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
        };

        let mut violations = Vec::new();
        for (field, value) in [
            ("full_name", &address.full_name),
            ("phone", &address.phone),
            ("street", &address.street),
            ("city", &address.city),
            ("state", &address.state),
            ("postal_code", &address.postal_code),
        ] {
            if value.is_empty() {
                violations.push(FieldViolation::new(field, "is required"));
            }
        }

        if !address.phone.is_empty() && !is_valid_phone(&address.phone) {
            violations.push(FieldViolation::new(
                "phone",
                "must be 10 digits starting with 6-9 and not all the same digit",
            ));
        }
        if !address.postal_code.is_empty() && !is_valid_postal_code(&address.postal_code) {
            violations.push(FieldViolation::new(
                "postal_code",
                "must be 6 digits not starting with 0",
            ));
        }

        if violations.is_empty() {
            Ok(address)
        } else {
            Err(DomainError::ValidationFailed(violations))
        }
    }
}

fn is_valid_phone(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 10
        && bytes.iter().all(u8::is_ascii_digit)
        && matches!(bytes[0], b'6'..=b'9')
        && bytes.iter().any(|b| *b != bytes[0])
}

fn is_valid_postal_code(postal_code: &str) -> bool {
    let bytes = postal_code.as_bytes();
    bytes.len() == 6 && bytes.iter().all(u8::is_ascii_digit) && bytes[0] != b'0'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Asha Traders".to_owned(),
            phone: "9876543210".to_owned(),
            street: "12 Market Road".to_owned(),
            city: "Pune".to_owned(),
            state: "Maharashtra".to_owned(),
            postal_code: "411001".to_owned(),
        }
    }

    fn violated_fields(err: DomainError) -> Vec<String> {
        match err {
            DomainError::ValidationFailed(violations) => {
                violations.into_iter().map(|v| v.field).collect()
            }
            other => panic!("expected ValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_address_is_trimmed() {
        let mut input = address();
        input.city = "  Pune ".to_owned();

        let validated = input.validated().unwrap();

        assert_eq!(validated.city, "Pune");
    }

    #[test]
    fn test_repeated_digit_phone_is_rejected() {
        let mut input = address();
        input.phone = "5555555555".to_owned();

        assert_eq!(violated_fields(input.validated().unwrap_err()), vec!["phone"]);
    }

    #[test]
    fn test_phone_rules() {
        assert!(is_valid_phone("6000000001"));
        assert!(!is_valid_phone("9999999999"));
        assert!(!is_valid_phone("5876543210"));
        assert!(!is_valid_phone("987654321"));
        assert!(!is_valid_phone("98765432a0"));
    }

    #[test]
    fn test_postal_code_rules() {
        assert!(is_valid_postal_code("560001"));
        assert!(!is_valid_postal_code("060001"));
        assert!(!is_valid_postal_code("56001"));
        assert!(!is_valid_postal_code("56 001"));
    }

    #[test]
    fn test_every_violation_is_reported() {
        let input = ShippingAddress {
            phone: "123".to_owned(),
            postal_code: "000000".to_owned(),
            ..ShippingAddress::default()
        };

        assert_eq!(
            violated_fields(input.validated().unwrap_err()),
            vec!["full_name", "street", "city", "state", "phone", "postal_code"]
        );
    }

    #[test]
    fn test_whitespace_only_field_is_missing() {
        let mut input = address();
        input.full_name = "   ".to_owned();

        assert_eq!(
            violated_fields(input.validated().unwrap_err()),
            vec!["full_name"]
        );
    }
}
