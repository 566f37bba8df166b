// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::fail::Fail;
use ::libc::EINVAL;
use ::std::{
    fmt,
    str::FromStr,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// EtherType field of an Ethernet II frame.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct EtherType2(u16);

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl EtherType2 {
    /// 802.1Q tag protocol identifier. Signals that a VLAN tag follows the source address.
    pub const VLAN: EtherType2 = EtherType2(0x8100);
    /// Local experimental EtherType used by the echo tools.
    pub const EXPERIMENTAL: EtherType2 = EtherType2(0x88b5);

    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    pub fn is_vlan(self) -> bool {
        self == Self::VLAN
    }

    pub fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for EtherType2 {
    fn default() -> Self {
        Self::EXPERIMENTAL
    }
}

impl fmt::Display for EtherType2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl fmt::Debug for EtherType2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EtherType2({})", self)
    }
}

/// Parses hexadecimal notation, with or without a `0x` prefix.
impl FromStr for EtherType2 {
    type Err = Fail;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s: &str = s.trim();
        let digits: &str = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        match u16::from_str_radix(digits, 16) {
            Ok(value) => Ok(Self(value)),
            Err(_) => Err(Fail::new(EINVAL, "invalid EtherType, use hex (e.g., 0x88B5)")),
        }
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================

#[cfg(test)]
mod tests {
    use crate::protocols::layer2::EtherType2;
    use ::anyhow::Result;

    #[test]
    fn test_ethertype_parse_hex() -> Result<()> {
        assert_eq!("0x88B5".parse::<EtherType2>()?, EtherType2::EXPERIMENTAL);
        assert_eq!("88b5".parse::<EtherType2>()?, EtherType2::new(0x88b5));
        assert_eq!("0X8100".parse::<EtherType2>()?, EtherType2::VLAN);
        Ok(())
    }

    #[test]
    fn test_ethertype_parse_rejects_invalid() {
        assert!("0xZZZZ".parse::<EtherType2>().is_err());
        assert!("0x188B5".parse::<EtherType2>().is_err());
        assert!("".parse::<EtherType2>().is_err());
    }

    #[test]
    fn test_ethertype_display() {
        assert_eq!(EtherType2::EXPERIMENTAL.to_string(), "0x88B5");
        assert!(EtherType2::VLAN.is_vlan());
    }
}
