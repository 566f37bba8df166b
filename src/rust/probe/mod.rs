// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod engine;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::engine::ProbeEngine;

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    protocols::layer2::{
        EtherType2,
        Ethernet2Header,
    },
    runtime::network::types::MacAddress,
};
use ::std::time::Duration;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Outcome of a single probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeResult {
    /// A qualifying reply arrived after `rtt`. `frame_len` is the length of the reply on the wire.
    Matched { rtt: Duration, frame_len: usize },
    /// A qualifying reply arrived but its payload differs from what was sent.
    Mismatched,
    /// No qualifying reply arrived within the probe timeout.
    TimedOut,
}

/// Whether a reply's payload must be compared against the probe's.
#[derive(Clone, Copy, Debug)]
pub enum PayloadCheck<'a> {
    Ignore,
    Exact(&'a [u8]),
}

/// Address and EtherType a frame must carry to be taken as the reply to a probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplyFilter {
    /// Peer that echoes our probes. Replies come from it.
    peer_addr: MacAddress,
    /// Our own address. Replies are sent to it.
    local_addr: MacAddress,
    ether_type: EtherType2,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl ProbeResult {
    pub fn is_matched(&self) -> bool {
        matches!(self, ProbeResult::Matched { .. })
    }

    pub fn rtt(&self) -> Option<Duration> {
        match self {
            ProbeResult::Matched { rtt, .. } => Some(*rtt),
            _ => None,
        }
    }
}

impl ReplyFilter {
    pub fn new(peer_addr: MacAddress, local_addr: MacAddress, ether_type: EtherType2) -> Self {
        Self {
            peer_addr,
            local_addr,
            ether_type,
        }
    }

    /// Checks whether a frame with header `hdr` qualifies as a reply.
    pub fn qualifies(&self, hdr: &Ethernet2Header) -> bool {
        self.addresses_match(hdr) && hdr.effective_ether_type() == self.ether_type
    }

    /// Checks only the address pair, regardless of EtherType.
    pub fn addresses_match(&self, hdr: &Ethernet2Header) -> bool {
        hdr.src_addr() == self.peer_addr && hdr.dst_addr() == self.local_addr
    }

    pub fn peer_addr(&self) -> MacAddress {
        self.peer_addr
    }

    pub fn local_addr(&self) -> MacAddress {
        self.local_addr
    }

    pub fn ether_type(&self) -> EtherType2 {
        self.ether_type
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
