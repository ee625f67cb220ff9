use std::collections::BTreeMap;

/// Reserved payload key that marks a push as vendor-originated. The value
/// is irrelevant; presence alone decides ownership.
pub const VENDOR_PAYLOAD_KEY: &str = "p";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageOwnership {
    OwnedByVendor,
    NotOwned,
}

/// Decide whether an inbound push payload belongs to the vendor platform.
///
/// An absent or empty mapping is never vendor-owned; otherwise ownership is
/// exactly the presence of [`VENDOR_PAYLOAD_KEY`]. No other heuristic is
/// applied, so a host can multiplex one delivery channel between vendor and
/// application messages without parsing the payload.
pub fn classify(payload: Option<&BTreeMap<String, String>>) -> MessageOwnership {
    match payload {
        Some(data) if data.contains_key(VENDOR_PAYLOAD_KEY) => MessageOwnership::OwnedByVendor,
        _ => MessageOwnership::NotOwned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
    }

    #[test]
    fn absent_and_empty_payloads_are_not_owned() {
        assert_eq!(classify(None), MessageOwnership::NotOwned);
        assert_eq!(classify(Some(&BTreeMap::new())), MessageOwnership::NotOwned);
    }

    #[test]
    fn ownership_is_exactly_the_reserved_key() {
        let owned = payload(&[("p", "{\"alert\":\"hi\"}")]);
        assert_eq!(classify(Some(&owned)), MessageOwnership::OwnedByVendor);

        // Value is irrelevant, even empty.
        let owned_empty_value = payload(&[("p", "")]);
        assert_eq!(classify(Some(&owned_empty_value)), MessageOwnership::OwnedByVendor);

        let not_owned = payload(&[("title", "hello"), ("body", "world")]);
        assert_eq!(classify(Some(&not_owned)), MessageOwnership::NotOwned);

        // No substring or case heuristics.
        let near_miss = payload(&[("P", "x"), ("pp", "y")]);
        assert_eq!(classify(Some(&near_miss)), MessageOwnership::NotOwned);
    }
}
