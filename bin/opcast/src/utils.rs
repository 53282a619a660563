use ethers::types::{Address, H256, U256};
use std::{str::FromStr, time::Duration};

/// Parses address from string
pub fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|_| format!("String {s} is not a valid address"))
}

/// Parses U256 from string
pub fn parse_u256(s: &str) -> Result<U256, String> {
    U256::from_str_radix(s, 10).map_err(|_| format!("String {s} is not a valid U256"))
}

/// Parses a 32-byte salt from a 0x-prefixed hex string
pub fn parse_salt(s: &str) -> Result<H256, String> {
    H256::from_str(s).map_err(|_| format!("String {s} is not a valid 32-byte salt"))
}

/// Parses a duration given in seconds
pub fn parse_duration(duration: &str) -> Result<Duration, String> {
    let seconds: u64 = duration.parse().map_err(|_| format!("{duration} must be unsigned int"))?;
    Ok(Duration::from_secs(seconds))
}

/// Validates a private key given as 64 hex characters, with or without a 0x
/// prefix
pub fn validate_private_key(hex_string: &str) -> Result<String, String> {
    let stripped = hex_string.strip_prefix("0x").unwrap_or(hex_string);

    if stripped.chars().count() != 64 {
        return Err(format!("{hex_string} is not a valid private key"));
    }

    for c in stripped.chars() {
        if !c.is_ascii_hexdigit() {
            return Err(format!("{hex_string} is not a valid hexadecimal string"));
        }
    }

    Ok(String::from(hex_string))
}
