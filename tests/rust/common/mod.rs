// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod runtime;

//==============================================================================
// Exports
//==============================================================================

pub use self::runtime::ChannelLayer;

//==============================================================================
// Imports
//==============================================================================

use ::l2probe::MacAddress;

//==============================================================================
// Constants
//==============================================================================

/// Link address of the probe client.
pub const ALICE_MAC: MacAddress = MacAddress::new([0x12, 0x23, 0x45, 0x67, 0x89, 0xab]);
/// Link address of the echo server.
pub const BOB_MAC: MacAddress = MacAddress::new([0xab, 0x89, 0x67, 0x45, 0x23, 0x12]);
