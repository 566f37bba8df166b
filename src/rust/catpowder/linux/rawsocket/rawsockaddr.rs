// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::socket2::SockAddr;
use ::std::{
    mem,
    ptr,
};

//======================================================================================================================
// Constants & Structures
//======================================================================================================================

/// Packet type of frames the host itself sent (see `linux/if_packet.h`).
const PACKET_OUTGOING: u8 = 4;

#[derive(Clone, Copy)]
pub struct RawSocketAddr(libc::sockaddr_ll);

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl RawSocketAddr {
    /// Creates a link-layer address on interface `ifindex`. `protocol` is in host byte order.
    pub fn new(ifindex: i32, protocol: u16, mac_addr: &[u8; 6]) -> Self {
        // Pad MAC address.
        let mut addr: [u8; 8] = [0_u8; 8];
        addr[..6].copy_from_slice(mac_addr);

        RawSocketAddr(libc::sockaddr_ll {
            sll_family: libc::AF_PACKET as libc::c_ushort,
            sll_protocol: protocol.to_be(),
            sll_ifindex: ifindex,
            sll_hatype: 0,
            sll_pkttype: 0,
            sll_halen: libc::ETH_ALEN as u8,
            sll_addr: addr,
        })
    }

    /// Wraps a link-layer address filled in by the kernel.
    pub fn from_raw(sll: libc::sockaddr_ll) -> Self {
        Self(sll)
    }

    pub fn to_sockaddr(&self) -> SockAddr {
        let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
        unsafe {
            ptr::write(&mut storage as *mut libc::sockaddr_storage as *mut libc::sockaddr_ll, self.0);
            SockAddr::new(storage, mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t)
        }
    }

    /// Checks whether this address describes a frame sent by the local host.
    pub fn is_outgoing(&self) -> bool {
        self.0.sll_pkttype == PACKET_OUTGOING
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
