// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::crossbeam_channel::{
    Receiver,
    RecvTimeoutError,
    Sender,
};
use ::l2probe::{
    Fail,
    PhysicalLayer,
};
use ::std::time::Duration;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Medium backed by a pair of channels. Whatever one end transmits, the other end receives.
pub struct ChannelLayer {
    /// Incoming Queue of Frames
    incoming: Receiver<Vec<u8>>,
    /// Outgoing Queue of Frames
    outgoing: Sender<Vec<u8>>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl ChannelLayer {
    /// Creates two connected ends.
    pub fn pair() -> (Self, Self) {
        let (alice_tx, bob_rx): (Sender<Vec<u8>>, Receiver<Vec<u8>>) = crossbeam_channel::unbounded();
        let (bob_tx, alice_rx): (Sender<Vec<u8>>, Receiver<Vec<u8>>) = crossbeam_channel::unbounded();
        let alice: Self = Self {
            incoming: alice_rx,
            outgoing: alice_tx,
        };
        let bob: Self = Self {
            incoming: bob_rx,
            outgoing: bob_tx,
        };
        (alice, bob)
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl PhysicalLayer for ChannelLayer {
    fn transmit(&mut self, frame: &[u8]) -> Result<(), Fail> {
        match self.outgoing.send(frame.to_vec()) {
            Ok(()) => Ok(()),
            Err(_) => Err(Fail::new(libc::ENOTCONN, "the other end is gone")),
        }
    }

    fn receive(&mut self, timeout: Option<Duration>) -> Result<Option<Vec<u8>>, Fail> {
        let disconnected: Fail = Fail::new(libc::ENOTCONN, "the other end is gone");
        match timeout {
            Some(timeout) => match self.incoming.recv_timeout(timeout) {
                Ok(frame) => Ok(Some(frame)),
                Err(RecvTimeoutError::Timeout) => Ok(None),
                Err(RecvTimeoutError::Disconnected) => Err(disconnected),
            },
            None => match self.incoming.recv() {
                Ok(frame) => Ok(Some(frame)),
                Err(_) => Err(disconnected),
            },
        }
    }
}
