// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::std::time::Duration;

//======================================================================================================================
// Constants
//======================================================================================================================

/// Size of the receive buffer of the raw socket (in bytes).
pub const RECVBUF_SIZE_MAX: usize = 65535;

/// Pause after the medium fails to deliver a frame, before it is read again.
pub const RECEIVE_RETRY_WAIT: Duration = Duration::from_millis(10);

/// Per-probe timeout budget used when none is configured.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Payload size used by the RTT, jitter and integrity disciplines when none is configured.
pub const DEFAULT_PAYLOAD_SIZE: usize = 100;

/// Payload size used by the throughput discipline when none is configured.
pub const DEFAULT_THROUGHPUT_PAYLOAD_SIZE: usize = 500;

/// Payload sizes exercised by the variable frame size discipline when none are configured.
pub const DEFAULT_FRAME_SIZES: [usize; 6] = [64, 128, 256, 512, 1024, 1500];
