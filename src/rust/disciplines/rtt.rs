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
use ::std::{
    thread,
    time::Duration,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Round-trip latency discipline parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RttParams {
    /// Number of probes.
    pub count: usize,
    /// Delay between consecutive probes.
    pub interval: Duration,
    /// Payload size (in bytes).
    pub payload_size: usize,
}

/// Round-trip time of one probe. `rtt` is `None` if the probe went unanswered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RttSample {
    /// Position of the probe in the run, starting at 1.
    pub seq: usize,
    pub rtt: Option<Duration>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RttReport {
    samples: Vec<RttSample>,
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Sends `params.count` probes, one at a time, and records how long each took to come back.
pub fn run_rtt<L: PhysicalLayer>(
    engine: &mut ProbeEngine<L>,
    session: &Session,
    params: &RttParams,
) -> Result<RttReport, Fail> {
    let payload: Vec<u8> = session.payload().generate(params.payload_size);
    let frame: Vec<u8> = session.build_probe(&payload)?;
    let filter: ReplyFilter = session.reply_filter();
    let mut report: RttReport = RttReport::default();

    info!("starting RTT test ({} probes of {} bytes)", params.count, payload.len());
    for seq in 1..=params.count {
        let rtt: Option<Duration> = match engine.probe(&frame, &filter, PayloadCheck::Ignore) {
            ProbeResult::Matched { rtt, .. } => {
                info!("[{}] RTT: {:.3} ms", seq, as_millis_f64(rtt));
                Some(rtt)
            },
            _ => {
                info!("[{}] Timeout", seq);
                None
            },
        };
        report.samples.push(RttSample { seq, rtt });

        if seq < params.count {
            thread::sleep(params.interval);
        }
    }

    Ok(report)
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl RttReport {
    pub fn samples(&self) -> &[RttSample] {
        &self.samples
    }

    pub fn sent(&self) -> usize {
        self.samples.len()
    }

    pub fn received(&self) -> usize {
        self.samples.iter().filter(|sample| sample.rtt.is_some()).count()
    }

    /// Share of unanswered probes, in percent.
    pub fn loss_percent(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        (self.sent() - self.received()) as f64 * 100.0 / self.sent() as f64
    }

    pub fn min(&self) -> Option<Duration> {
        self.rtts().min()
    }

    pub fn max(&self) -> Option<Duration> {
        self.rtts().max()
    }

    pub fn avg(&self) -> Option<Duration> {
        let received: u32 = self.received() as u32;
        if received == 0 {
            return None;
        }
        Some(self.rtts().sum::<Duration>() / received)
    }

    fn rtts(&self) -> impl Iterator<Item = Duration> + '_ {
        self.samples.iter().filter_map(|sample| sample.rtt)
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for RttParams {
    fn default() -> Self {
        Self {
            count: 10,
            interval: Duration::from_millis(100),
            payload_size: DEFAULT_PAYLOAD_SIZE,
        }
    }
}

impl Report for RttReport {
    fn name(&self) -> &'static str {
        "rtt_test"
    }

    fn header(&self) -> &'static [&'static str] {
        &["Seq", "RTT_ms"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.samples
            .iter()
            .map(|sample| {
                let rtt: String = match sample.rtt {
                    Some(rtt) => format!("{:.3}", as_millis_f64(rtt)),
                    None => "timeout".to_string(),
                };
                vec![sample.seq.to_string(), rtt]
            })
            .collect()
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
