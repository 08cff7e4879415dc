//! Conversions between dotted-decimal text and the `u32` form stored for each address.
//!
//! Octet 0 of the dotted form is the most significant byte (bits 31-24) of the integer.

use std::net::Ipv4Addr;

use crate::error::{AddressError, Result};

/// Parses a dotted-decimal IPv4 address.
///
/// Only canonical text is accepted: four decimal octets in `0..=255`, no signs,
/// whitespace or leading zeros.
pub fn decode(dotted: &str) -> Result<u32> {
    dotted
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| AddressError::InvalidAddress(format!("{dotted} is not a valid IPv4 dotted decimal address")))
}

pub fn encode(value: u32) -> String {
    Ipv4Addr::from(value).to_string()
}

/// Narrows a wider integer (e.g. a database `BIGINT`) back to an address.
pub fn narrow(value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| AddressError::InvalidAddress(format!("{value} is not a valid IPv4 long address")))
}
