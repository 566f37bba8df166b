// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    protocols::layer2::{
        EtherType2,
        Ethernet2Header,
    },
    runtime::{
        fail::Fail,
        network::types::MacAddress,
    },
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// Smallest frame the medium carries, excluding the frame check sequence. Shorter frames are zero-padded on the wire.
pub const MIN_FRAME_SIZE: usize = 60;

//======================================================================================================================
// Structures
//======================================================================================================================

/// A decoded Ethernet frame that borrows its payload from the receive buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ethernet2Frame<'a> {
    header: Ethernet2Header,
    payload: &'a [u8],
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Builds a raw Ethernet frame, 802.1Q tagged if `vlan_id` is given.
pub fn encode(
    dst_addr: MacAddress,
    src_addr: MacAddress,
    ether_type: EtherType2,
    payload: &[u8],
    vlan_id: Option<u16>,
) -> Result<Vec<u8>, Fail> {
    let header: Ethernet2Header = match vlan_id {
        Some(vlan_id) => Ethernet2Header::new_tagged(dst_addr, src_addr, ether_type, vlan_id)?,
        None => Ethernet2Header::new(dst_addr, src_addr, ether_type),
    };
    Ok(Ethernet2Frame::new(header, payload).serialize())
}

/// Parses a raw Ethernet frame. Frames shorter than a bare Ethernet II header are rejected.
pub fn decode(buf: &[u8]) -> Result<Ethernet2Frame, Fail> {
    let (header, payload) = Ethernet2Header::parse(buf)?;
    Ok(Ethernet2Frame { header, payload })
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl<'a> Ethernet2Frame<'a> {
    pub fn new(header: Ethernet2Header, payload: &'a [u8]) -> Self {
        Self { header, payload }
    }

    pub fn header(&self) -> &Ethernet2Header {
        &self.header
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Length of the frame on the wire (header and payload).
    pub fn total_len(&self) -> usize {
        self.header.compute_size() + self.payload.len()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf: Vec<u8> = Vec::with_capacity(self.total_len());
        self.header.serialize(&mut buf);
        buf.extend_from_slice(self.payload);
        buf
    }

    /// Builds the reply to the target frame: addresses swapped, tag and payload untouched.
    pub fn echo(&self) -> Vec<u8> {
        Ethernet2Frame::new(self.header.reversed(), self.payload).serialize()
    }

    /// Checks whether the target frame carries `expected` as payload.
    ///
    /// When the frame is exactly as long as the shortest frame the medium carries, trailing zero bytes after
    /// `expected` are taken as padding and ignored.
    pub fn carries(&self, expected: &[u8]) -> bool {
        if self.payload == expected {
            return true;
        }
        self.total_len() == MIN_FRAME_SIZE
            && self.payload.len() > expected.len()
            && self.payload.starts_with(expected)
            && self.payload[expected.len()..].iter().all(|b| *b == 0)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::layer2::{
        ETHERNET2_HEADER_SIZE,
        VLAN_ID_MAX,
    };
    use ::anyhow::Result;

    const DST: MacAddress = MacAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    const SRC: MacAddress = MacAddress::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);

    #[test]
    fn test_encode_untagged_layout() -> Result<()> {
        let bytes: Vec<u8> = encode(DST, SRC, EtherType2::EXPERIMENTAL, b"hi", None)?;
        assert_eq!(
            bytes,
            [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x88, 0xb5, 0x68, 0x69]
        );

        let frame: Ethernet2Frame = decode(&bytes)?;
        assert_eq!(frame.header().dst_addr(), DST);
        assert_eq!(frame.header().src_addr(), SRC);
        assert_eq!(frame.header().ether_type(), EtherType2::EXPERIMENTAL);
        assert_eq!(frame.header().vlan_id(), None);
        assert_eq!(frame.payload(), b"hi");
        Ok(())
    }

    #[test]
    fn test_untagged_round_trip() -> Result<()> {
        let ether_types: [EtherType2; 4] = [
            EtherType2::EXPERIMENTAL,
            EtherType2::new(0x0800),
            EtherType2::new(0x88b6),
            EtherType2::new(0xffff),
        ];
        for ether_type in ether_types {
            for len in [0, 1, 46, 1500] {
                let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
                let bytes: Vec<u8> = encode(DST, SRC, ether_type, &payload, None)?;
                assert_eq!(bytes.len(), ETHERNET2_HEADER_SIZE + len);

                let frame: Ethernet2Frame = decode(&bytes)?;
                assert_eq!(frame.header().dst_addr(), DST);
                assert_eq!(frame.header().src_addr(), SRC);
                assert_eq!(frame.header().ether_type(), ether_type);
                assert_eq!(frame.header().vlan_id(), None);
                assert_eq!(frame.payload(), payload.as_slice());
            }
        }
        Ok(())
    }

    #[test]
    fn test_encode_tagged_layout() -> Result<()> {
        let bytes: Vec<u8> = encode(DST, SRC, EtherType2::EXPERIMENTAL, &[], Some(42))?;
        assert_eq!(bytes.len(), 18);
        assert_eq!(bytes[12..14], [0x81, 0x00]);
        assert_eq!(bytes[14..16], [0x00, 0x2a]);
        assert_eq!(bytes[16..18], [0x88, 0xb5]);
        Ok(())
    }

    #[test]
    fn test_vlan_round_trip_all_ids() -> Result<()> {
        let payload: [u8; 3] = [1, 2, 3];
        for vlan_id in 0..=VLAN_ID_MAX {
            let bytes: Vec<u8> = encode(DST, SRC, EtherType2::EXPERIMENTAL, &payload, Some(vlan_id))?;
            assert_eq!(bytes[12..14], [0x81, 0x00]);
            let frame: Ethernet2Frame = decode(&bytes)?;
            assert_eq!(frame.header().vlan_id(), Some(vlan_id));
            assert_eq!(frame.header().effective_ether_type(), EtherType2::EXPERIMENTAL);
            assert_eq!(frame.payload(), &payload);
        }
        Ok(())
    }

    #[test]
    fn test_encode_rejects_invalid_vlan_id() {
        match encode(DST, SRC, EtherType2::EXPERIMENTAL, b"x", Some(VLAN_ID_MAX + 1)) {
            Err(e) => assert_eq!(e.errno, libc::EINVAL),
            Ok(_) => panic!("encode should fail"),
        }
    }

    #[test]
    fn test_decode_rejects_short_frames() {
        let bytes: [u8; ETHERNET2_HEADER_SIZE] = [0; ETHERNET2_HEADER_SIZE];
        for len in 0..ETHERNET2_HEADER_SIZE {
            match decode(&bytes[..len]) {
                Err(e) => assert_eq!(e.errno, libc::EBADMSG),
                Ok(_) => panic!("{}-byte frame should be rejected", len),
            }
        }
        assert!(decode(&bytes).is_ok());
    }

    #[test]
    fn test_decode_short_tagged_frame_is_untagged() -> Result<()> {
        let mut bytes: Vec<u8> = encode(DST, SRC, EtherType2::EXPERIMENTAL, &[], Some(1))?;
        for len in ETHERNET2_HEADER_SIZE..bytes.len() {
            bytes.truncate(len);
            let frame: Ethernet2Frame = decode(&bytes)?;
            assert_eq!(frame.header().vlan_id(), None);
            assert_eq!(frame.payload().len(), len - ETHERNET2_HEADER_SIZE);
        }
        Ok(())
    }

    #[test]
    fn test_decode_empty_payload() -> Result<()> {
        let bytes: Vec<u8> = encode(DST, SRC, EtherType2::new(0x0800), &[], None)?;
        let frame: Ethernet2Frame = decode(&bytes)?;
        assert!(frame.payload().is_empty());
        assert_eq!(frame.total_len(), ETHERNET2_HEADER_SIZE);
        Ok(())
    }

    #[test]
    fn test_echo_is_symmetric() -> Result<()> {
        let bytes: Vec<u8> = encode(DST, SRC, EtherType2::EXPERIMENTAL, b"payload", Some(300))?;
        let echoed: Vec<u8> = decode(&bytes)?.echo();
        let reply: Ethernet2Frame = decode(&echoed)?;
        assert_eq!(reply.header().dst_addr(), SRC);
        assert_eq!(reply.header().src_addr(), DST);
        assert_eq!(reply.header().vlan_id(), Some(300));
        assert_eq!(reply.header().effective_ether_type(), EtherType2::EXPERIMENTAL);
        assert_eq!(reply.payload(), b"payload");
        assert_eq!(echoed[12..18], bytes[12..18]);
        Ok(())
    }

    #[test]
    fn test_carries_tolerates_padding_only_on_minimum_frames() -> Result<()> {
        let mut padded: Vec<u8> = encode(DST, SRC, EtherType2::EXPERIMENTAL, b"hi", None)?;
        padded.resize(MIN_FRAME_SIZE, 0);
        assert!(decode(&padded)?.carries(b"hi"));
        assert!(!decode(&padded)?.carries(b"ho"));

        let mut longer: Vec<u8> = padded.clone();
        longer.push(0);
        assert!(!decode(&longer)?.carries(b"hi"));
        Ok(())
    }
}
