//! CIDR block expansion.

use ipnet::Ipv4Net;

use crate::address::{codec, AddressRange};
use crate::error::{AddressError, Result};

/// Inclusive range covered by `network_address/mask_bits`, network and broadcast included.
///
/// Host bits set in `network_address` are masked off, so `1.0.0.5/24` covers the same
/// range as `1.0.0.0/24`.
pub fn expand(network_address: &str, mask_bits: i64) -> Result<AddressRange> {
    let block = format!("{network_address}/{mask_bits}");
    let address = codec::decode(network_address)
        .map_err(|e| AddressError::InvalidCidr(format!("CIDR block {block} is invalid: {e}")))?;
    let prefix = u8::try_from(mask_bits)
        .ok()
        .filter(|bits| *bits <= 32)
        .ok_or_else(|| AddressError::InvalidCidr(format!("CIDR block {block} has a mask outside 0-32")))?;
    let net = Ipv4Net::new(address.into(), prefix)
        .map_err(|e| AddressError::InvalidCidr(format!("CIDR block {block} is invalid: {e}")))?;

    AddressRange::new(u32::from(net.network()), u32::from(net.broadcast()))
        .ok_or_else(|| AddressError::InvalidCidr(format!("CIDR block {block} is empty")))
}

/// Parses `a.b.c.d/n` text, as used for configured seed blocks.
pub fn parse_block(block: &str) -> Result<(String, i64)> {
    let (address, mask) = block
        .trim()
        .split_once('/')
        .ok_or_else(|| AddressError::InvalidCidr(format!("CIDR block {block} has no mask")))?;
    let mask: i64 = mask
        .parse()
        .map_err(|_| AddressError::InvalidCidr(format!("CIDR block {block} has a non-numeric mask")))?;
    Ok((address.to_string(), mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_24_spans_network_and_broadcast() {
        let range = expand("1.0.0.0", 24).unwrap();
        assert_eq!(range.start(), 16777216);
        assert_eq!(range.end(), 16777471);
        assert_eq!(codec::encode(range.start()), "1.0.0.0");
        assert_eq!(codec::encode(range.end()), "1.0.0.255");
    }

    #[test]
    fn slash_30_holds_four_addresses() {
        let range = expand("1.0.0.0", 30).unwrap();
        assert_eq!(range.len(), 4);
        assert_eq!(codec::encode(range.end()), "1.0.0.3");
    }

    #[test]
    fn mask_edges() {
        let all = expand("10.1.2.3", 0).unwrap();
        assert_eq!((all.start(), all.end()), (0, u32::MAX));

        let single = expand("10.1.2.3", 32).unwrap();
        assert_eq!(single.start(), single.end());
        assert_eq!(codec::encode(single.start()), "10.1.2.3");
    }

    #[test]
    fn host_bits_are_masked_off() {
        assert_eq!(expand("1.0.0.5", 24).unwrap(), expand("1.0.0.0", 24).unwrap());
    }

    #[test]
    fn rejects_bad_masks_and_addresses() {
        for (address, mask) in [("1.0.0.0", 33), ("1.0.0.0", -1), ("1.0.0", 24), ("256.0.0.0", 8)] {
            assert!(
                matches!(expand(address, mask), Err(AddressError::InvalidCidr(_))),
                "{address}/{mask} should be rejected"
            );
        }
    }

    #[test]
    fn parses_block_text() {
        assert_eq!(parse_block("10.0.0.0/24").unwrap(), ("10.0.0.0".to_string(), 24));
        assert!(matches!(parse_block("10.0.0.0"), Err(AddressError::InvalidCidr(_))));
        assert!(matches!(parse_block("10.0.0.0/x"), Err(AddressError::InvalidCidr(_))));
    }
}
