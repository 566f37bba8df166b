// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

pub mod layer1;
pub mod layer2;
