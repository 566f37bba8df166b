// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

pub mod ifaddr;
mod rawsocket;

//======================================================================================================================
// Imports
//======================================================================================================================

use self::{
    ifaddr::{
        get_ifindex,
        get_link_addr,
    },
    rawsocket::{
        RawReception,
        RawSocket,
        RawSocketAddr,
        StrippedTag,
    },
};
use crate::{
    protocols::{
        layer1::PhysicalLayer,
        layer2::{
            EtherType2,
            ETHERNET2_HEADER_SIZE,
        },
    },
    runtime::{
        fail::Fail,
        network::{
            consts::RECVBUF_SIZE_MAX,
            types::MacAddress,
        },
    },
};
use ::libc::{
    EINVAL,
    EIO,
};
use ::std::{
    mem::MaybeUninit,
    time::{
        Duration,
        Instant,
    },
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// Length of the destination and source addresses that open every frame.
const MAC_ADDRS_SIZE: usize = 12;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Physical layer backed by an `AF_PACKET` raw socket bound to a single interface.
pub struct LinuxRawLayer {
    ifindex: i32,
    link_addr: MacAddress,
    socket: RawSocket,
    recvbuf: Box<[MaybeUninit<u8>]>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl LinuxRawLayer {
    /// Opens a raw socket on `ifname`.
    ///
    /// When `filter` is given the kernel only delivers frames whose top-level EtherType matches it. Otherwise frames
    /// of every protocol are delivered.
    pub fn new(ifname: &str, filter: Option<EtherType2>) -> Result<Self, Fail> {
        let ifindex: i32 = get_ifindex(ifname)?;
        let link_addr: MacAddress = get_link_addr(ifname)?;
        let protocol: u16 = match filter {
            Some(ether_type) => ether_type.value(),
            None => libc::ETH_P_ALL as u16,
        };

        let socket: RawSocket = RawSocket::new(protocol)?;
        socket.bind(&RawSocketAddr::new(ifindex, protocol, &[0; 6]))?;
        info!(
            "raw socket bound (ifname={:?}, ifindex={}, link_addr={}, protocol=0x{:04X})",
            ifname, ifindex, link_addr, protocol
        );

        Ok(Self {
            ifindex,
            link_addr,
            socket,
            recvbuf: vec![MaybeUninit::uninit(); RECVBUF_SIZE_MAX].into_boxed_slice(),
        })
    }

    /// Hardware address of the interface, as resolved when the socket was opened.
    pub fn link_addr(&self) -> MacAddress {
        self.link_addr
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl PhysicalLayer for LinuxRawLayer {
    fn transmit(&mut self, frame: &[u8]) -> Result<(), Fail> {
        if frame.len() < ETHERNET2_HEADER_SIZE {
            return Err(Fail::new(EINVAL, "frame too small"));
        }
        let mut dst_addr: [u8; 6] = [0; 6];
        dst_addr.copy_from_slice(&frame[0..6]);
        let dst_sockaddr: RawSocketAddr = RawSocketAddr::new(self.ifindex, 0, &dst_addr);

        let nbytes: usize = self.socket.sendto(frame, &dst_sockaddr)?;
        if nbytes != frame.len() {
            let cause: String = format!("short send ({} of {} bytes)", nbytes, frame.len());
            return Err(Fail::new(EIO, &cause));
        }
        Ok(())
    }

    fn receive(&mut self, timeout: Option<Duration>) -> Result<Option<Vec<u8>>, Fail> {
        let deadline: Option<Instant> = timeout.map(|timeout| Instant::now() + timeout);
        loop {
            let remaining: Option<Duration> = match deadline {
                Some(deadline) => {
                    let remaining: Duration = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Ok(None);
                    }
                    Some(remaining)
                },
                None => None,
            };

            let reception: RawReception = match self.socket.recvmsg(&mut self.recvbuf, remaining)? {
                Some(reception) => reception,
                None => return Ok(None),
            };

            // The kernel loops our own transmissions back to packet sockets.
            if reception.origin_addr.is_outgoing() {
                trace!("receive(): skipping outgoing frame ({} bytes)", reception.nbytes);
                continue;
            }

            let mut frame: Vec<u8> = self.recvbuf[..reception.nbytes]
                .iter()
                .map(|byte| unsafe { byte.assume_init() })
                .collect();
            if let Some(tag) = reception.stripped_tag {
                reinsert_vlan_tag(&mut frame, tag);
            }
            return Ok(Some(frame));
        }
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Puts an 802.1Q tag that the kernel moved into the packet metadata back between the source address and the
/// EtherType.
fn reinsert_vlan_tag(frame: &mut Vec<u8>, tag: StrippedTag) {
    if frame.len() < MAC_ADDRS_SIZE {
        return;
    }
    let mut vlan_tag: [u8; 4] = [0; 4];
    vlan_tag[..2].copy_from_slice(&tag.tpid.to_be_bytes());
    vlan_tag[2..].copy_from_slice(&tag.tci.to_be_bytes());
    frame.splice(MAC_ADDRS_SIZE..MAC_ADDRS_SIZE, vlan_tag);
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::layer2::{
        decode,
        encode,
        Ethernet2Frame,
    };
    use ::anyhow::Result;

    const DST: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x01]);
    const SRC: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x02]);

    #[test]
    fn test_reinsert_vlan_tag_rebuilds_tagged_frame() -> Result<()> {
        let mut frame: Vec<u8> = encode(DST, SRC, EtherType2::EXPERIMENTAL, b"offloaded", None)?;
        reinsert_vlan_tag(
            &mut frame,
            StrippedTag {
                tpid: EtherType2::VLAN.value(),
                tci: 42,
            },
        );
        assert_eq!(frame, encode(DST, SRC, EtherType2::EXPERIMENTAL, b"offloaded", Some(42))?);

        let tagged: Ethernet2Frame = decode(&frame)?;
        assert_eq!(tagged.header().vlan_id(), Some(42));
        assert_eq!(tagged.header().effective_ether_type(), EtherType2::EXPERIMENTAL);
        assert_eq!(tagged.payload(), b"offloaded");
        Ok(())
    }

    #[test]
    fn test_reinsert_vlan_tag_keeps_priority_bits() -> Result<()> {
        let mut frame: Vec<u8> = encode(DST, SRC, EtherType2::EXPERIMENTAL, b"", None)?;
        reinsert_vlan_tag(
            &mut frame,
            StrippedTag {
                tpid: EtherType2::VLAN.value(),
                tci: 0x6000 | 100,
            },
        );
        assert_eq!(frame[12..16], [0x81, 0x00, 0x60, 0x64]);
        assert_eq!(decode(&frame)?.header().vlan_id(), Some(100));
        Ok(())
    }
}
