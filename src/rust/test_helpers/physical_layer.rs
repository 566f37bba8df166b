// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    protocols::{
        layer1::PhysicalLayer,
        layer2::decode,
    },
    runtime::{
        fail::Fail,
        logging,
    },
};
use ::std::{
    collections::VecDeque,
    thread,
    time::Duration,
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// Wait applied when a blocking receive finds nothing to deliver.
const IDLE_WAIT: Duration = Duration::from_millis(1);

//======================================================================================================================
// Structures
//======================================================================================================================

/// What the simulated peer does with the next frame we transmit.
#[derive(Clone, Debug)]
pub enum PeerAction {
    /// Reflect the frame, like the echo responder would.
    Echo,
    /// Swallow the frame.
    Drop,
    /// Reflect the frame with its last byte flipped.
    Corrupt,
    /// Deliver unrelated frames first, then reflect the frame.
    NoiseThenEcho(Vec<Vec<u8>>),
}

/// In-memory medium. Frames pushed with [TestPhysicalLayer::push_frame] are received in order, transmitted frames are
/// kept for inspection. Optionally a scripted peer answers every transmission.
pub struct TestPhysicalLayer {
    incoming: VecDeque<Vec<u8>>,
    outgoing: VecDeque<Vec<u8>>,
    /// Scripted peer. `None` disables it.
    script: Option<VecDeque<PeerAction>>,
    /// Frame handed out whenever `incoming` is empty.
    flood: Option<Vec<u8>>,
    /// Number of upcoming transmissions that fail.
    transmit_failures: usize,
    /// Number of upcoming receptions that fail.
    receive_failures: usize,
    /// Number of times the medium was read.
    receive_calls: usize,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl TestPhysicalLayer {
    pub fn new() -> Self {
        logging::initialize("debug");
        Self {
            incoming: VecDeque::new(),
            outgoing: VecDeque::new(),
            script: None,
            flood: None,
            transmit_failures: 0,
            receive_failures: 0,
            receive_calls: 0,
        }
    }

    /// Creates a medium with a peer that plays `script`, one action per transmission. Once the script runs out the
    /// peer keeps echoing.
    pub fn echoing(script: Vec<PeerAction>) -> Self {
        let mut layer: Self = Self::new();
        layer.script = Some(script.into());
        layer
    }

    pub fn push_frame(&mut self, frame: Vec<u8>) {
        self.incoming.push_back(frame);
    }

    /// Removes the oldest transmitted frame. There should be at least one.
    pub fn pop_frame(&mut self) -> Vec<u8> {
        self.outgoing.pop_front().expect("should be at least one frame")
    }

    pub fn outgoing(&self) -> &VecDeque<Vec<u8>> {
        &self.outgoing
    }

    pub fn flood_with(&mut self, frame: Vec<u8>) {
        self.flood = Some(frame);
    }

    pub fn fail_transmissions(&mut self, count: usize) {
        self.transmit_failures = count;
    }

    /// Makes the next `count` receptions fail right away, like a medium whose interface went down.
    pub fn fail_receptions(&mut self, count: usize) {
        self.receive_failures = count;
    }

    pub fn receive_calls(&self) -> usize {
        self.receive_calls
    }

    fn answer(&mut self, frame: &[u8]) {
        let action: PeerAction = match self.script.as_mut() {
            Some(script) => script.pop_front().unwrap_or(PeerAction::Echo),
            None => return,
        };
        let mut reply: Vec<u8> = match decode(frame) {
            Ok(frame) => frame.echo(),
            Err(_) => return,
        };
        match action {
            PeerAction::Echo => self.incoming.push_back(reply),
            PeerAction::Drop => (),
            PeerAction::Corrupt => {
                if let Some(last) = reply.last_mut() {
                    *last ^= 0xff;
                }
                self.incoming.push_back(reply);
            },
            PeerAction::NoiseThenEcho(noise) => {
                self.incoming.extend(noise);
                self.incoming.push_back(reply);
            },
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl PhysicalLayer for TestPhysicalLayer {
    fn transmit(&mut self, frame: &[u8]) -> Result<(), Fail> {
        if self.transmit_failures > 0 {
            self.transmit_failures -= 1;
            return Err(Fail::new(libc::ENOBUFS, "simulated transmit failure"));
        }
        debug!("transmit frame: {:?} total frame size: {:?}", self.outgoing.len(), frame.len());
        self.outgoing.push_back(frame.to_vec());
        self.answer(frame);
        Ok(())
    }

    fn receive(&mut self, timeout: Option<Duration>) -> Result<Option<Vec<u8>>, Fail> {
        self.receive_calls += 1;
        if self.receive_failures > 0 {
            self.receive_failures -= 1;
            return Err(Fail::new(libc::ENETDOWN, "simulated receive failure"));
        }
        if let Some(frame) = self.incoming.pop_front() {
            return Ok(Some(frame));
        }
        if let Some(frame) = self.flood.as_ref() {
            return Ok(Some(frame.clone()));
        }
        thread::sleep(timeout.unwrap_or(IDLE_WAIT));
        Ok(None)
    }
}
