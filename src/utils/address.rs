use alloy_primitives::Address;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static ENS_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)?$").expect("valid ENS regex")
});

static ADDRESS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid address regex"));

/// Parses a `0x` address. Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(value: &str) -> Option<Address> {
    if !ADDRESS_REGEX.is_match(value) {
        return None;
    }
    let hex = &value[2..];
    let mixed_case = hex.chars().any(|c| c.is_ascii_lowercase()) && hex.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case { Address::parse_checksummed(value, None).ok() } else { Address::from_str(value).ok() }
}

/// True for strings that look like a resolvable name such as `vitalik.eth`.
pub fn is_ens_name(value: &str) -> bool {
    parse_address(value).is_none() && ENS_NAME_REGEX.is_match(value)
}
