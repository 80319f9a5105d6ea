use super::value_objects::Address;
use crate::store::NewAddress;

/// Maps an inbound address to the row that should be stored, or `None` when
/// the address has no first line. The stored country is always the
/// configured one; the payload's own country is not written.
pub fn normalize(address: &Address, country: &str) -> Option<NewAddress> {
    if address.is_absent() {
        return None;
    }

    if !address.country.is_empty() && address.country != country {
        tracing::debug!(
            inbound_country = %address.country,
            stored_country = %country,
            "Address country replaced by configured country"
        );
    }

    Some(NewAddress {
        line1: address.line1.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        country: country.to_string(),
    })
}
