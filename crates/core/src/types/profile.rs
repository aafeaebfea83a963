//! Shopper profile types.

use serde::{Deserialize, Serialize};

/// Contact and shipping details for the signed-in shopper.
///
/// Checkout requires the five shipping fields to be filled in; the rest is
/// informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopperProfile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

impl ShopperProfile {
    /// Whether the profile carries everything checkout needs.
    ///
    /// All of phone, address, city, postal code, and country must be
    /// non-blank. Whitespace-only values count as missing.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            &self.phone,
            &self.address,
            &self.city,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    /// Names of the required shipping fields that are still blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ShopperProfile {
        ShopperProfile {
            full_name: "A. Shopper".to_string(),
            email: "a@example.com".to_string(),
            phone: "+27 82 000 0000".to_string(),
            address: "1 Orchard Lane".to_string(),
            city: "Cape Town".to_string(),
            postal_code: "8001".to_string(),
            country: "ZA".to_string(),
        }
    }

    #[test]
    fn test_complete_profile() {
        assert!(complete().is_complete());
        assert!(complete().missing_fields().is_empty());
    }

    #[test]
    fn test_missing_postal_code_is_incomplete() {
        let profile = ShopperProfile {
            postal_code: String::new(),
            ..complete()
        };
        assert!(!profile.is_complete());
        assert_eq!(profile.missing_fields(), vec!["postal_code"]);
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let profile = ShopperProfile {
            city: "   ".to_string(),
            ..complete()
        };
        assert!(!profile.is_complete());
    }

    #[test]
    fn test_optional_fields_do_not_gate_checkout() {
        let profile = ShopperProfile {
            full_name: String::new(),
            email: String::new(),
            ..complete()
        };
        assert!(profile.is_complete());
    }
}
