use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

pub const DEFAULT_REGION: &str = "TW";

/// Shipping or billing address. At least one address line is required;
/// the region code defaults to `TW` when the caller omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub recipient: Option<String>,
    pub lines: Vec<String>,
    pub locality: String,
    pub administrative_area: Option<String>,
    pub postal_code: String,
    pub region: String,
    pub phone: Option<String>,
}

impl Address {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.lines.is_empty() || self.lines.iter().all(|l| l.trim().is_empty()) {
            return Err(ServiceError::InvalidRequest(
                "address requires at least one address line".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_address_lines() {
        let address = Address {
            recipient: None,
            lines: vec![],
            locality: "Taipei".into(),
            administrative_area: None,
            postal_code: "100".into(),
            region: DEFAULT_REGION.into(),
            phone: None,
        };
        assert!(address.validate().is_err());

        let blank = Address {
            lines: vec!["   ".into()],
            ..address
        };
        assert!(blank.validate().is_err());
    }
}
