//! External request -> internal command mapping.

use crate::adapter::wire::{ExternalAddress, ExternalCart};
use crate::errors::ServiceError;
use crate::models::address::DEFAULT_REGION;
use crate::models::Address;

/// Flatten the nested external cart representation into `(offer_id, quantity)`
/// pairs. Quantities below 1 are rejected before any storage access.
pub fn from_external_cart(cart: &ExternalCart) -> Result<Vec<(String, u32)>, ServiceError> {
    if cart.line_items.is_empty() {
        return Err(ServiceError::InvalidRequest(
            "cart requires at least one line item".into(),
        ));
    }
    cart.line_items
        .iter()
        .map(|line| {
            if line.quantity < 1 {
                return Err(ServiceError::InvalidRequest(format!(
                    "quantity for offer {} must be at least 1",
                    line.offer.offer_id
                )));
            }
            if line.offer.offer_id.trim().is_empty() {
                return Err(ServiceError::InvalidRequest(
                    "line item is missing an offer id".into(),
                ));
            }
            Ok((line.offer.offer_id.clone(), line.quantity))
        })
        .collect()
}

/// Map an external address, defaulting the region code when absent.
pub fn from_external_address(address: ExternalAddress) -> Address {
    Address {
        recipient: address.recipient,
        lines: address.address_lines,
        locality: address.locality,
        administrative_area: address.administrative_area,
        postal_code: address.postal_code,
        region: address
            .region_code
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        phone: address.phone,
    }
}
