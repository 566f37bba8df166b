// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod rawsockaddr;
mod rawsocket;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::{
    rawsockaddr::RawSocketAddr,
    rawsocket::{
        RawReception,
        RawSocket,
        StrippedTag,
    },
};
