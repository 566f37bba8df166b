// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod physical_layer;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::physical_layer::{
    PeerAction,
    TestPhysicalLayer,
};
