//! Protocol entry points.
//!
//! Every handler follows the same pipeline: the kill switch and metrics
//! middleware run first, then the credential verifier appropriate to the
//! route, then the storage collaborator strictly filtered by the resolved
//! identity, then the schema adapter.

pub mod availability;
pub mod checkout;
pub mod legacy;
pub mod orders;
pub mod profile;

use serde::Deserialize;

/// Legacy query parameter carrying an explicit merchant identifier.
#[derive(Debug, Deserialize)]
pub struct MerchantIdQuery {
    pub merchant_id: Option<String>,
}
