// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    protocols::{
        layer1::PhysicalLayer,
        layer2::{
            decode,
            EtherType2,
            Ethernet2Frame,
        },
    },
    runtime::{
        fail::Fail,
        network::{
            consts::RECEIVE_RETRY_WAIT,
            types::MacAddress,
        },
    },
};
use ::std::{
    thread,
    time::{
        Duration,
        Instant,
    },
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// How often the responder dumps its counters.
const LOG_INTERVAL: Duration = Duration::from_secs(5);

//======================================================================================================================
// Structures
//======================================================================================================================

/// What happened to a single frame taken off the medium.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EchoOutcome {
    /// The frame matched the filter and its reply was sent.
    Echoed { payload_len: usize, vlan_id: Option<u16> },
    /// The frame carried some other EtherType.
    Ignored,
    /// The frame was too short to parse.
    Rejected,
    /// The frame matched but the reply could not be sent.
    TransmitFailed(Fail),
    /// Nothing arrived.
    Idle,
}

/// Counters kept by the responder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EchoStats {
    pub received: u64,
    pub echoed: u64,
    pub ignored: u64,
    pub rejected: u64,
    pub transmit_failures: u64,
    /// Failed reads of the medium.
    pub receive_errors: u64,
}

/// Echo server: reflects every frame of the configured EtherType back to its sender.
pub struct EchoResponder<L: PhysicalLayer> {
    layer: L,
    filter: EtherType2,
    stats: EchoStats,
    /// Whether the last read of the medium failed.
    receive_failing: bool,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl<L: PhysicalLayer> EchoResponder<L> {
    pub fn new(layer: L, filter: EtherType2) -> Self {
        Self {
            layer,
            filter,
            stats: EchoStats::default(),
            receive_failing: false,
        }
    }

    /// Serves frames until the process is terminated. Receive errors are counted and the loop keeps going.
    pub fn run(&mut self) -> ! {
        info!("echo responder listening (filter={})", self.filter);
        let mut last_log_time: Instant = Instant::now();
        loop {
            self.serve_once(None);

            if last_log_time.elapsed() > LOG_INTERVAL {
                debug!("echo stats: {:?}", self.stats);
                last_log_time = Instant::now();
            }
        }
    }

    /// One iteration of [Self::run].
    ///
    /// After a receive error the medium is left alone for [RECEIVE_RETRY_WAIT]. Only the first error of a streak is
    /// logged as a warning, the rest show up in the counters.
    fn serve_once(&mut self, timeout: Option<Duration>) {
        match self.poll_once(timeout) {
            Ok(_) => {
                if self.receive_failing {
                    info!("receiving again ({} receive errors so far)", self.stats.receive_errors);
                    self.receive_failing = false;
                }
            },
            Err(e) => {
                self.stats.receive_errors += 1;
                if !self.receive_failing {
                    warn!("failed to receive frame: {:?}", e);
                    self.receive_failing = true;
                }
                thread::sleep(RECEIVE_RETRY_WAIT);
            },
        }
    }

    /// Takes at most one frame off the medium and answers it if it matches the filter.
    ///
    /// Fails only if the medium could not be read. Everything else is reported through [EchoOutcome].
    pub fn poll_once(&mut self, timeout: Option<Duration>) -> Result<EchoOutcome, Fail> {
        let buf: Vec<u8> = match self.layer.receive(timeout)? {
            Some(buf) => buf,
            None => return Ok(EchoOutcome::Idle),
        };
        self.stats.received += 1;
        Ok(self.handle(&buf))
    }

    fn handle(&mut self, buf: &[u8]) -> EchoOutcome {
        let frame: Ethernet2Frame = match decode(buf) {
            Ok(frame) => frame,
            Err(_) => {
                self.stats.rejected += 1;
                return EchoOutcome::Rejected;
            },
        };

        if frame.header().effective_ether_type() != self.filter {
            self.stats.ignored += 1;
            return EchoOutcome::Ignored;
        }

        let src_addr: MacAddress = frame.header().src_addr();
        let payload_len: usize = frame.payload().len();
        let vlan_id: Option<u16> = frame.header().vlan_id();
        match vlan_id {
            Some(vlan_id) => info!(
                "[VLAN {}] received frame from {}, size = {}",
                vlan_id, src_addr, payload_len
            ),
            None => info!("received frame from {}, size = {}", src_addr, payload_len),
        }

        match self.layer.transmit(&frame.echo()) {
            Ok(()) => {
                self.stats.echoed += 1;
                debug!("echoed back to {}", src_addr);
                EchoOutcome::Echoed { payload_len, vlan_id }
            },
            Err(e) => {
                self.stats.transmit_failures += 1;
                error!("failed to echo frame to {}: {:?}", src_addr, e);
                EchoOutcome::TransmitFailed(e)
            },
        }
    }

    pub fn stats(&self) -> EchoStats {
        self.stats
    }

    pub fn layer_mut(&mut self) -> &mut L {
        &mut self.layer
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
