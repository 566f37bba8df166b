// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    disciplines::Report,
    probe::{
        PayloadCheck,
        ProbeEngine,
        ProbeResult,
        ReplyFilter,
    },
    protocols::layer1::PhysicalLayer,
    runtime::{
        fail::Fail,
        network::consts::DEFAULT_FRAME_SIZES,
    },
    session::{
        PayloadGenerator,
        Session,
    },
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Variable frame size discipline parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSizeParams {
    /// Payload sizes to try, in order.
    pub sizes: Vec<usize>,
}

/// Pairs of payload size sent and reply frame length received (0 if no reply came back).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSizeReport {
    samples: Vec<(usize, usize)>,
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Sends one probe with a random payload of each size in `params.sizes`.
pub fn run_frame_size<L: PhysicalLayer>(
    engine: &mut ProbeEngine<L>,
    session: &Session,
    params: &FrameSizeParams,
) -> Result<FrameSizeReport, Fail> {
    let filter: ReplyFilter = session.reply_filter();
    let mut report: FrameSizeReport = FrameSizeReport::default();

    info!("starting frame size test ({:?})", params.sizes);
    for size in params.sizes.iter().copied() {
        let payload: Vec<u8> = PayloadGenerator::random(size);
        let frame: Vec<u8> = session.build_probe(&payload)?;
        let received: usize = match engine.probe(&frame, &filter, PayloadCheck::Ignore) {
            ProbeResult::Matched { frame_len, .. } => {
                info!("payload {} bytes: received {} bytes", size, frame_len);
                frame_len
            },
            _ => {
                info!("payload {} bytes: Timeout", size);
                0
            },
        };
        report.samples.push((size, received));
    }

    Ok(report)
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl FrameSizeReport {
    pub fn samples(&self) -> &[(usize, usize)] {
        &self.samples
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for FrameSizeParams {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_FRAME_SIZES.to_vec(),
        }
    }
}

impl Report for FrameSizeReport {
    fn name(&self) -> &'static str {
        "frame_size_test"
    }

    fn header(&self) -> &'static [&'static str] {
        &["Payload_Bytes", "Received_Bytes"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.samples
            .iter()
            .map(|(size, received)| vec![size.to_string(), received.to_string()])
            .collect()
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
