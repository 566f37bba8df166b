// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::fail::Fail;
use ::std::time::Duration;

//======================================================================================================================
// Traits
//======================================================================================================================

/// API for the physical medium that carries raw Ethernet frames (e.g., raw sockets, in-memory test links).
///
/// Implementations may pre-filter received frames (for instance, by EtherType) but callers must not rely on it.
pub trait PhysicalLayer {
    /// Transmits a single, fully formed Ethernet frame.
    fn transmit(&mut self, frame: &[u8]) -> Result<(), Fail>;

    /// Receives a single Ethernet frame.
    ///
    /// Blocks for at most `timeout`, or indefinitely if `timeout` is `None`. Returns `Ok(None)` when no frame arrived
    /// in time.
    fn receive(&mut self, timeout: Option<Duration>) -> Result<Option<Vec<u8>>, Fail>;
}

impl<P: PhysicalLayer + ?Sized> PhysicalLayer for Box<P> {
    fn transmit(&mut self, frame: &[u8]) -> Result<(), Fail> {
        (**self).transmit(frame)
    }

    fn receive(&mut self, timeout: Option<Duration>) -> Result<Option<Vec<u8>>, Fail> {
        (**self).receive(timeout)
    }
}
