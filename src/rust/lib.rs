// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]

#[macro_use]
extern crate log;

//======================================================================================================================
// Modules
//======================================================================================================================

pub mod catpowder;
pub mod disciplines;
pub mod echo;
pub mod probe;
pub mod protocols;
pub mod runtime;
pub mod session;
pub mod sink;

#[cfg(test)]
mod test_helpers;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use crate::{
    echo::{
        EchoOutcome,
        EchoResponder,
    },
    probe::{
        PayloadCheck,
        ProbeEngine,
        ProbeResult,
        ReplyFilter,
    },
    protocols::{
        layer1::PhysicalLayer,
        layer2::{
            EtherType2,
            Ethernet2Frame,
            Ethernet2Header,
            VlanTag,
        },
    },
    runtime::{
        fail::Fail,
        network::types::MacAddress,
    },
    session::{
        config::Config,
        PayloadGenerator,
        Session,
    },
};
