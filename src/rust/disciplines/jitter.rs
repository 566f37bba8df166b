// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    disciplines::{
        as_millis_f64,
        Report,
    },
    probe::{
        PayloadCheck,
        ProbeEngine,
        ReplyFilter,
    },
    protocols::layer1::PhysicalLayer,
    runtime::{
        fail::Fail,
        network::consts::DEFAULT_PAYLOAD_SIZE,
    },
    session::Session,
};
use ::std::{
    thread,
    time::Duration,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Jitter discipline parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JitterParams {
    pub count: usize,
    pub interval: Duration,
    pub payload_size: usize,
}

/// Delays of the answered probes, in the order they were sent. Unanswered probes leave no trace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JitterReport {
    delays: Vec<Duration>,
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

pub fn run_jitter<L: PhysicalLayer>(
    engine: &mut ProbeEngine<L>,
    session: &Session,
    params: &JitterParams,
) -> Result<JitterReport, Fail> {
    let payload: Vec<u8> = session.payload().generate(params.payload_size);
    let frame: Vec<u8> = session.build_probe(&payload)?;
    let filter: ReplyFilter = session.reply_filter();
    let mut report: JitterReport = JitterReport::default();

    info!("starting jitter test ({} probes)", params.count);
    for i in 0..params.count {
        if let Some(rtt) = engine.probe(&frame, &filter, PayloadCheck::Ignore).rtt() {
            report.delays.push(rtt);
        }
        if i + 1 < params.count {
            thread::sleep(params.interval);
        }
    }

    match report.average() {
        Some(average) => info!("average jitter: {:.3} ms", average),
        None => info!("not enough replies to compute jitter"),
    }
    Ok(report)
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl JitterReport {
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Absolute differences between consecutive delays, in milliseconds. Empty with fewer than two delays.
    pub fn jitter(&self) -> Vec<f64> {
        self.delays
            .windows(2)
            .map(|pair| (as_millis_f64(pair[1]) - as_millis_f64(pair[0])).abs())
            .collect()
    }

    /// Mean jitter, in milliseconds.
    pub fn average(&self) -> Option<f64> {
        let jitter: Vec<f64> = self.jitter();
        if jitter.is_empty() {
            return None;
        }
        Some(jitter.iter().sum::<f64>() / jitter.len() as f64)
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for JitterParams {
    fn default() -> Self {
        Self {
            count: 20,
            interval: Duration::from_millis(50),
            payload_size: DEFAULT_PAYLOAD_SIZE,
        }
    }
}

impl Report for JitterReport {
    fn name(&self) -> &'static str {
        "jitter_test"
    }

    fn header(&self) -> &'static [&'static str] {
        &["Sample", "Jitter_ms"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.jitter()
            .iter()
            .enumerate()
            .map(|(i, jitter)| vec![(i + 1).to_string(), format!("{:.3}", jitter)])
            .collect()
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
    const TIMEOUT: Duration = Duration::from_millis(20);

    fn run(script: Vec<PeerAction>, count: usize) -> Result<JitterReport> {
        let session: Session = Session::new("test0", LOCAL, PEER, EtherType2::EXPERIMENTAL, None)?;
        let mut engine: ProbeEngine<TestPhysicalLayer> = ProbeEngine::new(TestPhysicalLayer::echoing(script), TIMEOUT);
        let params: JitterParams = JitterParams {
            count,
            interval: Duration::ZERO,
            payload_size: 64,
        };
        Ok(run_jitter(&mut engine, &session, &params)?)
    }

    #[test]
    fn test_jitter_skips_unanswered_probes() -> Result<()> {
        let report: JitterReport = run(vec![PeerAction::Echo, PeerAction::Drop, PeerAction::Echo, PeerAction::Echo], 4)?;
        assert_eq!(report.delays().len(), 3);
        assert_eq!(report.jitter().len(), 2);
        assert!(report.jitter().iter().all(|jitter| *jitter >= 0.0));
        assert_eq!(report.rows().len(), 2);
        assert!(report.average().is_some());
        Ok(())
    }

    #[test]
    fn test_jitter_needs_two_delays() -> Result<()> {
        let report: JitterReport = run(vec![PeerAction::Echo, PeerAction::Drop], 2)?;
        assert_eq!(report.delays().len(), 1);
        assert!(report.jitter().is_empty());
        assert_eq!(report.average(), None);
        Ok(())
    }

    #[test]
    fn test_jitter_of_known_delays() {
        let report: JitterReport = JitterReport {
            delays: vec![
                Duration::from_millis(10),
                Duration::from_millis(13),
                Duration::from_millis(11),
            ],
        };
        let jitter: Vec<f64> = report.jitter();
        assert!((jitter[0] - 3.0).abs() < 1e-9);
        assert!((jitter[1] - 2.0).abs() < 1e-9);
        assert_eq!(report.rows()[1], ["2", "2.000"]);
    }
}
