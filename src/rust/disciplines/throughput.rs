// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    disciplines::Report,
    probe::{
        ProbeEngine,
        ReplyFilter,
    },
    protocols::{
        layer1::PhysicalLayer,
        layer2::{
            decode,
            Ethernet2Frame,
        },
    },
    runtime::{
        fail::Fail,
        network::consts::DEFAULT_THROUGHPUT_PAYLOAD_SIZE,
    },
    session::Session,
};
use ::std::time::{
    Duration,
    Instant,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Throughput discipline parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThroughputParams {
    /// How long to keep sending.
    pub duration: Duration,
    /// Payload size (in bytes).
    pub payload_size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThroughputReport {
    sent: u64,
    received: u64,
    elapsed: Duration,
    payload_size: usize,
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Sends the same probe over and over for `params.duration`, waiting briefly after each one for a reply, and counts
/// how many replies make it back.
///
/// Replies are matched on addresses only. Payloads are not inspected and a reply is not tied to a specific probe.
pub fn run_throughput<L: PhysicalLayer>(
    engine: &mut ProbeEngine<L>,
    session: &Session,
    params: &ThroughputParams,
) -> Result<ThroughputReport, Fail> {
    let payload: Vec<u8> = session.payload().generate(params.payload_size);
    let frame: Vec<u8> = session.build_probe(&payload)?;
    let filter: ReplyFilter = session.reply_filter();
    let mut sent: u64 = 0;
    let mut received: u64 = 0;

    info!(
        "starting throughput test ({} ms, {} byte payloads)",
        params.duration.as_millis(),
        payload.len()
    );
    let start: Instant = Instant::now();
    while start.elapsed() < params.duration {
        match engine.transmit(&frame) {
            Ok(()) => sent += 1,
            Err(e) => warn!("run_throughput(): failed to transmit frame: {:?}", e),
        }

        let budget: Duration = engine
            .timeout()
            .min(params.duration.saturating_sub(start.elapsed()));
        if budget.is_zero() {
            break;
        }
        if let Some(buf) = engine.receive_within(budget) {
            let reply: Ethernet2Frame = match decode(&buf) {
                Ok(reply) => reply,
                Err(_) => continue,
            };
            if filter.addresses_match(reply.header()) {
                received += 1;
            }
        }
    }

    let report: ThroughputReport = ThroughputReport {
        sent,
        received,
        elapsed: start.elapsed(),
        payload_size: payload.len(),
    };
    info!(
        "sent: {}, received: {}, throughput: {:.2} bps",
        report.sent,
        report.received,
        report.bits_per_second()
    );
    Ok(report)
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl ThroughputReport {
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Payload bits echoed back per second of test time.
    pub fn bits_per_second(&self) -> f64 {
        let elapsed: f64 = self.elapsed.as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.received * self.payload_size as u64 * 8) as f64 / elapsed
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for ThroughputParams {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(10),
            payload_size: DEFAULT_THROUGHPUT_PAYLOAD_SIZE,
        }
    }
}

impl Report for ThroughputReport {
    fn name(&self) -> &'static str {
        "throughput_test"
    }

    fn header(&self) -> &'static [&'static str] {
        &["Sent", "Received", "Throughput_bps"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.sent.to_string(),
            self.received.to_string(),
            format!("{:.2}", self.bits_per_second()),
        ]]
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

    const LOCAL: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x01]);
    const PEER: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x02]);
    const TIMEOUT: Duration = Duration::from_millis(5);

    fn params() -> ThroughputParams {
        ThroughputParams {
            duration: Duration::from_millis(50),
            payload_size: 500,
        }
    }

    #[test]
    fn test_throughput_counts_echoed_frames() -> Result<()> {
        let session: Session = Session::new("test0", LOCAL, PEER, EtherType2::EXPERIMENTAL, None)?;
        let mut engine: ProbeEngine<TestPhysicalLayer> = ProbeEngine::new(TestPhysicalLayer::echoing(vec![]), TIMEOUT);

        let report: ThroughputReport = run_throughput(&mut engine, &session, &params())?;
        assert!(report.sent() > 0);
        assert!(report.received() <= report.sent() && report.received() + 1 >= report.sent());
        assert!(report.elapsed() >= params().duration);
        assert!(report.bits_per_second() > 0.0);
        assert_eq!(report.rows().len(), 1);
        Ok(())
    }

    #[test]
    fn test_throughput_silent_peer() -> Result<()> {
        let session: Session = Session::new("test0", LOCAL, PEER, EtherType2::EXPERIMENTAL, None)?;
        let layer: TestPhysicalLayer = TestPhysicalLayer::echoing(vec![PeerAction::Drop; 1000]);
        let mut engine: ProbeEngine<TestPhysicalLayer> = ProbeEngine::new(layer, TIMEOUT);

        let report: ThroughputReport = run_throughput(&mut engine, &session, &params())?;
        assert!(report.sent() > 0);
        assert_eq!(report.received(), 0);
        assert_eq!(report.bits_per_second(), 0.0);
        Ok(())
    }

    #[test]
    fn test_throughput_zero_elapsed() {
        let report: ThroughputReport = ThroughputReport {
            sent: 1,
            received: 1,
            elapsed: Duration::ZERO,
            payload_size: 500,
        };
        assert_eq!(report.bits_per_second(), 0.0);
    }
}
