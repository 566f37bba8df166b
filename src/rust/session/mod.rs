// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

pub mod config;
mod payload;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::payload::PayloadGenerator;

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    probe::ReplyFilter,
    protocols::layer2::{
        encode,
        EtherType2,
        VLAN_ID_MAX,
    },
    runtime::{
        fail::Fail,
        network::{
            consts::DEFAULT_PROBE_TIMEOUT,
            types::MacAddress,
        },
    },
};
use ::libc::EINVAL;
use ::std::time::Duration;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Parameters shared by every discipline of a client run. Built once at startup, never modified.
#[derive(Clone, Debug)]
pub struct Session {
    interface_name: String,
    local_addr: MacAddress,
    peer_addr: MacAddress,
    ether_type: EtherType2,
    vlan_id: Option<u16>,
    payload: PayloadGenerator,
    probe_timeout: Duration,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl Session {
    pub fn new(
        interface_name: &str,
        local_addr: MacAddress,
        peer_addr: MacAddress,
        ether_type: EtherType2,
        vlan_id: Option<u16>,
    ) -> Result<Self, Fail> {
        if ether_type.is_vlan() {
            return Err(Fail::new(EINVAL, "EtherType 0x8100 is reserved for VLAN tags"));
        }
        if let Some(vlan_id) = vlan_id {
            if vlan_id > VLAN_ID_MAX {
                let cause: String = format!("invalid VLAN id {} (expected 0-{})", vlan_id, VLAN_ID_MAX);
                return Err(Fail::new(EINVAL, &cause));
            }
        }
        Ok(Self {
            interface_name: interface_name.to_string(),
            local_addr,
            peer_addr,
            ether_type,
            vlan_id,
            payload: PayloadGenerator::Random,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        })
    }

    pub fn with_payload(mut self, payload: PayloadGenerator) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Builds a probe frame addressed to the peer, tagged if the session uses a VLAN.
    pub fn build_probe(&self, payload: &[u8]) -> Result<Vec<u8>, Fail> {
        encode(self.peer_addr, self.local_addr, self.ether_type, payload, self.vlan_id)
    }

    /// Filter that picks the peer's replies to our probes.
    pub fn reply_filter(&self) -> ReplyFilter {
        ReplyFilter::new(self.peer_addr, self.local_addr, self.ether_type)
    }

    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    pub fn local_addr(&self) -> MacAddress {
        self.local_addr
    }

    pub fn peer_addr(&self) -> MacAddress {
        self.peer_addr
    }

    pub fn ether_type(&self) -> EtherType2 {
        self.ether_type
    }

    pub fn vlan_id(&self) -> Option<u16> {
        self.vlan_id
    }

    pub fn payload(&self) -> &PayloadGenerator {
        &self.payload
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
