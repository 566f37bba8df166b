// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Exports
//======================================================================================================================

pub mod ethernet2;
pub use self::ethernet2::{
    frame::{
        decode,
        encode,
        Ethernet2Frame,
        MIN_FRAME_SIZE,
    },
    header::{
        Ethernet2Header,
        VlanTag,
        ETHERNET2_HEADER_SIZE,
        VLAN_HEADER_SIZE,
        VLAN_ID_MAX,
    },
    protocol::EtherType2,
};
