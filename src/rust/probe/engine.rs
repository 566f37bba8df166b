// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    probe::{
        PayloadCheck,
        ProbeResult,
        ReplyFilter,
    },
    protocols::{
        layer1::PhysicalLayer,
        layer2::{
            decode,
            Ethernet2Frame,
        },
    },
    runtime::{
        fail::Fail,
        network::consts::RECEIVE_RETRY_WAIT,
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
// Structures
//======================================================================================================================

/// Client side of the echo exchange. Sends one probe at a time and waits for its reply.
pub struct ProbeEngine<L: PhysicalLayer> {
    layer: L,
    /// Per-probe wait budget.
    timeout: Duration,
    /// Receive errors in a row. Only the first of a streak is logged as a warning.
    receive_errors: u64,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl<L: PhysicalLayer> ProbeEngine<L> {
    pub fn new(layer: L, timeout: Duration) -> Self {
        Self {
            layer,
            timeout,
            receive_errors: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `frame` and waits up to the engine's timeout for a reply. See [Self::send_and_wait].
    pub fn probe(&mut self, frame: &[u8], filter: &ReplyFilter, check: PayloadCheck) -> ProbeResult {
        self.send_and_wait(frame, filter, check, self.timeout)
    }

    /// Sends `frame` and waits for the first frame that `filter` accepts.
    ///
    /// Frames that do not qualify are dropped without extending the wait: the deadline is fixed when the probe is
    /// sent, and every receive is bounded by what is left of it. A failed transmission can never be answered and is
    /// reported as [ProbeResult::TimedOut].
    pub fn send_and_wait(
        &mut self,
        frame: &[u8],
        filter: &ReplyFilter,
        check: PayloadCheck,
        timeout: Duration,
    ) -> ProbeResult {
        let start: Instant = Instant::now();
        if let Err(e) = self.layer.transmit(frame) {
            warn!("send_and_wait(): failed to transmit probe: {:?}", e);
            return ProbeResult::TimedOut;
        }
        let deadline: Instant = start + timeout;

        loop {
            let remaining: Duration = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return ProbeResult::TimedOut;
            }

            let buf: Vec<u8> = match self.receive_within(remaining) {
                Some(buf) => buf,
                None => continue,
            };
            let reply: Ethernet2Frame = match decode(&buf) {
                Ok(reply) => reply,
                Err(_) => continue,
            };
            if !filter.qualifies(reply.header()) {
                trace!("send_and_wait(): discarding {:?}", reply.header());
                continue;
            }

            let rtt: Duration = start.elapsed();
            return match check {
                PayloadCheck::Exact(expected) if !reply.carries(expected) => {
                    debug!("send_and_wait(): payload mismatch ({} bytes received)", reply.payload().len());
                    ProbeResult::Mismatched
                },
                _ => ProbeResult::Matched {
                    rtt,
                    frame_len: buf.len(),
                },
            };
        }
    }

    /// Sends `frame` without waiting for anything.
    pub fn transmit(&mut self, frame: &[u8]) -> Result<(), Fail> {
        self.layer.transmit(frame)
    }

    /// Takes the next frame off the medium, waiting up to `budget`. Receive errors read as silence.
    ///
    /// A failing medium is not read again before [RECEIVE_RETRY_WAIT] has passed (or `budget`, if shorter).
    pub fn receive_within(&mut self, budget: Duration) -> Option<Vec<u8>> {
        match self.layer.receive(Some(budget)) {
            Ok(buf) => {
                if self.receive_errors > 0 {
                    info!("receive_within(): medium recovered after {} failed reads", self.receive_errors);
                    self.receive_errors = 0;
                }
                buf
            },
            Err(e) => {
                if self.receive_errors == 0 {
                    warn!("receive_within(): failed to receive frame: {:?}", e);
                } else {
                    trace!("receive_within(): failed to receive frame: {:?}", e);
                }
                self.receive_errors += 1;
                thread::sleep(budget.min(RECEIVE_RETRY_WAIT));
                None
            },
        }
    }

    pub fn layer_mut(&mut self) -> &mut L {
        &mut self.layer
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
