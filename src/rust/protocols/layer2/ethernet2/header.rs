// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    protocols::layer2::EtherType2,
    runtime::{
        fail::Fail,
        network::types::MacAddress,
    },
};
use ::libc::{
    EBADMSG,
    EINVAL,
};

//======================================================================================================================
// Constants
//======================================================================================================================

pub const ETHERNET2_HEADER_SIZE: usize = 14;
pub const VLAN_TAG_SIZE: usize = 4;
pub const VLAN_HEADER_SIZE: usize = ETHERNET2_HEADER_SIZE + VLAN_TAG_SIZE;
pub const VLAN_ID_MAX: u16 = 4095;

const VLAN_ID_MASK: u16 = 0x0fff;
const VLAN_PCP_SHIFT: u16 = 13;

//======================================================================================================================
// Structures
//======================================================================================================================

/// 802.1Q tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VlanTag {
    // Bytes 14..16: priority, drop eligible indicator and VLAN identifier.
    tci: u16,
    // Bytes 16..18
    ether_type: EtherType2,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ethernet2Header {
    // Bytes 0..6
    dst_addr: MacAddress,
    // Bytes 6..12
    src_addr: MacAddress,
    // Bytes 12..14
    ether_type: EtherType2,
    // Bytes 14..18, only when `ether_type` is 0x8100.
    vlan: Option<VlanTag>,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl VlanTag {
    /// Creates a tag for `vlan_id` with priority bits cleared. Fails if `vlan_id` does not fit in 12 bits.
    pub fn new(vlan_id: u16, ether_type: EtherType2) -> Result<Self, Fail> {
        if vlan_id > VLAN_ID_MAX {
            let cause: String = format!("invalid VLAN id {} (expected 0-{})", vlan_id, VLAN_ID_MAX);
            return Err(Fail::new(EINVAL, &cause));
        }
        Ok(Self { tci: vlan_id, ether_type })
    }

    pub fn vlan_id(&self) -> u16 {
        self.tci & VLAN_ID_MASK
    }

    pub fn priority(&self) -> u8 {
        (self.tci >> VLAN_PCP_SHIFT) as u8
    }

    /// Raw tag control word, as found on the wire.
    pub fn tci(&self) -> u16 {
        self.tci
    }

    /// EtherType of the payload that follows the tag.
    pub fn ether_type(&self) -> EtherType2 {
        self.ether_type
    }
}

impl Ethernet2Header {
    /// Creates a header for an untagged Ethernet frame.
    pub fn new(dst_addr: MacAddress, src_addr: MacAddress, ether_type: EtherType2) -> Self {
        Self {
            dst_addr,
            src_addr,
            ether_type,
            vlan: None,
        }
    }

    /// Creates a header for an 802.1Q tagged Ethernet frame.
    pub fn new_tagged(
        dst_addr: MacAddress,
        src_addr: MacAddress,
        ether_type: EtherType2,
        vlan_id: u16,
    ) -> Result<Self, Fail> {
        Ok(Self {
            dst_addr,
            src_addr,
            ether_type: EtherType2::VLAN,
            vlan: Some(VlanTag::new(vlan_id, ether_type)?),
        })
    }

    pub fn compute_size(&self) -> usize {
        match self.vlan {
            Some(_) => VLAN_HEADER_SIZE,
            None => ETHERNET2_HEADER_SIZE,
        }
    }

    /// Parses the header at the front of `buf` and returns it along with the remaining bytes.
    ///
    /// A 0x8100 EtherType is treated as a tag only if the buffer is long enough to hold one. Otherwise the frame is
    /// read as untagged.
    pub fn parse(buf: &[u8]) -> Result<(Self, &[u8]), Fail> {
        if buf.len() < ETHERNET2_HEADER_SIZE {
            return Err(Fail::new(EBADMSG, "frame too small"));
        }
        let dst_addr: MacAddress = MacAddress::from_prefix(&buf[0..6]);
        let src_addr: MacAddress = MacAddress::from_prefix(&buf[6..12]);
        let ether_type: EtherType2 = EtherType2::new(u16::from_be_bytes([buf[12], buf[13]]));

        if ether_type.is_vlan() && buf.len() >= VLAN_HEADER_SIZE {
            let vlan: VlanTag = VlanTag {
                tci: u16::from_be_bytes([buf[14], buf[15]]),
                ether_type: EtherType2::new(u16::from_be_bytes([buf[16], buf[17]])),
            };
            let hdr: Self = Self {
                dst_addr,
                src_addr,
                ether_type,
                vlan: Some(vlan),
            };
            return Ok((hdr, &buf[VLAN_HEADER_SIZE..]));
        }

        let hdr: Self = Self {
            dst_addr,
            src_addr,
            ether_type,
            vlan: None,
        };
        Ok((hdr, &buf[ETHERNET2_HEADER_SIZE..]))
    }

    /// Appends the wire representation of the target header to `buf`.
    pub fn serialize(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.dst_addr.octets());
        buf.extend_from_slice(&self.src_addr.octets());
        buf.extend_from_slice(&self.ether_type.to_be_bytes());
        if let Some(vlan) = self.vlan {
            buf.extend_from_slice(&vlan.tci.to_be_bytes());
            buf.extend_from_slice(&vlan.ether_type.to_be_bytes());
        }
    }

    /// Returns a copy of the target header with source and destination swapped. Tag and EtherType are kept as is.
    pub fn reversed(&self) -> Self {
        Self {
            dst_addr: self.src_addr,
            src_addr: self.dst_addr,
            ether_type: self.ether_type,
            vlan: self.vlan,
        }
    }

    pub fn dst_addr(&self) -> MacAddress {
        self.dst_addr
    }

    pub fn src_addr(&self) -> MacAddress {
        self.src_addr
    }

    /// EtherType field at offset 12. This is 0x8100 for tagged frames.
    pub fn ether_type(&self) -> EtherType2 {
        self.ether_type
    }

    /// EtherType of the payload, looking through the VLAN tag if there is one.
    pub fn effective_ether_type(&self) -> EtherType2 {
        match self.vlan {
            Some(vlan) => vlan.ether_type,
            None => self.ether_type,
        }
    }

    pub fn vlan(&self) -> Option<VlanTag> {
        self.vlan
    }

    pub fn vlan_id(&self) -> Option<u16> {
        self.vlan.map(|vlan| vlan.vlan_id())
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
