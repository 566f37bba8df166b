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
        network::consts::DEFAULT_PAYLOAD_SIZE,
    },
    session::Session,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Integrity discipline parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntegrityParams {
    pub count: usize,
    pub payload_size: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    sent: usize,
    mismatched: usize,
    timed_out: usize,
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Sends `params.count` probes, each with a fresh payload, and counts the ones that did not come back intact.
pub fn run_integrity<L: PhysicalLayer>(
    engine: &mut ProbeEngine<L>,
    session: &Session,
    params: &IntegrityParams,
) -> Result<IntegrityReport, Fail> {
    let filter: ReplyFilter = session.reply_filter();
    let mut report: IntegrityReport = IntegrityReport::default();

    info!("starting integrity test ({} probes)", params.count);
    for i in 0..params.count {
        let payload: Vec<u8> = session.payload().generate(params.payload_size);
        let frame: Vec<u8> = session.build_probe(&payload)?;
        report.sent += 1;
        match engine.probe(&frame, &filter, PayloadCheck::Exact(&payload)) {
            ProbeResult::Matched { .. } => (),
            ProbeResult::Mismatched => {
                warn!("[{}] payload mismatch", i + 1);
                report.mismatched += 1;
            },
            ProbeResult::TimedOut => {
                warn!("[{}] Timeout", i + 1);
                report.timed_out += 1;
            },
        }
    }

    info!("sent: {}, errors: {}", report.sent, report.errors());
    Ok(report)
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl IntegrityReport {
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Probes that came back altered or not at all.
    pub fn errors(&self) -> usize {
        self.mismatched + self.timed_out
    }

    pub fn mismatched(&self) -> usize {
        self.mismatched
    }

    pub fn timed_out(&self) -> usize {
        self.timed_out
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for IntegrityParams {
    fn default() -> Self {
        Self {
            count: 10,
            payload_size: DEFAULT_PAYLOAD_SIZE,
        }
    }
}

impl Report for IntegrityReport {
    fn name(&self) -> &'static str {
        "integrity_test"
    }

    fn header(&self) -> &'static [&'static str] {
        &["Sent", "Errors"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![self.sent.to_string(), self.errors().to_string()]]
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        protocols::layer2::EtherType2,
        runtime::network::types::MacAddress,
        test_helpers::{
            PeerAction,
            TestPhysicalLayer,
        },
    };
    use ::anyhow::Result;
    use ::std::time::Duration;

    const LOCAL: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x01]);
    const PEER: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x02]);
    const TIMEOUT: Duration = Duration::from_millis(20);

    #[test]
    fn test_integrity_counts_losses_and_corruption() -> Result<()> {
        let session: Session = Session::new("test0", LOCAL, PEER, EtherType2::EXPERIMENTAL, None)?;
        let script: Vec<PeerAction> = vec![
            PeerAction::Echo,
            PeerAction::Drop,
            PeerAction::Corrupt,
            PeerAction::Drop,
            PeerAction::Echo,
        ];
        let mut engine: ProbeEngine<TestPhysicalLayer> = ProbeEngine::new(TestPhysicalLayer::echoing(script), TIMEOUT);
        let params: IntegrityParams = IntegrityParams {
            count: 5,
            payload_size: 100,
        };

        let report: IntegrityReport = run_integrity(&mut engine, &session, &params)?;
        assert_eq!(report.sent(), 5);
        assert_eq!(report.errors(), 3);
        assert_eq!(report.timed_out(), 2);
        assert_eq!(report.mismatched(), 1);
        assert_eq!(report.rows(), [["5", "3"]]);
        Ok(())
    }

    #[test]
    fn test_integrity_uses_fresh_payloads() -> Result<()> {
        let session: Session = Session::new("test0", LOCAL, PEER, EtherType2::EXPERIMENTAL, None)?;
        let mut engine: ProbeEngine<TestPhysicalLayer> = ProbeEngine::new(TestPhysicalLayer::echoing(vec![]), TIMEOUT);
        let params: IntegrityParams = IntegrityParams {
            count: 2,
            payload_size: 100,
        };

        let report: IntegrityReport = run_integrity(&mut engine, &session, &params)?;
        assert_eq!(report.errors(), 0);
        let first: Vec<u8> = engine.layer_mut().pop_frame();
        let second: Vec<u8> = engine.layer_mut().pop_frame();
        assert_ne!(first, second);
        Ok(())
    }
}
