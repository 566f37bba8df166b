// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod framesize;
mod integrity;
mod jitter;
mod rtt;
mod throughput;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::{
    framesize::{
        run_frame_size,
        FrameSizeParams,
        FrameSizeReport,
    },
    integrity::{
        run_integrity,
        IntegrityParams,
        IntegrityReport,
    },
    jitter::{
        run_jitter,
        JitterParams,
        JitterReport,
    },
    rtt::{
        run_rtt,
        RttParams,
        RttReport,
        RttSample,
    },
    throughput::{
        run_throughput,
        ThroughputParams,
        ThroughputReport,
    },
};

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::fail::Fail;
use ::libc::EINVAL;
use ::std::{
    fmt,
    str::FromStr,
    time::Duration,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Measurement disciplines offered by the probe client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Discipline {
    Rtt,
    Throughput,
    Jitter,
    Integrity,
    FrameSize,
}

//======================================================================================================================
// Traits
//======================================================================================================================

/// Tabular view of a discipline's results, consumed by result sinks.
pub trait Report {
    /// Short name of the table, used to name its output.
    fn name(&self) -> &'static str;

    /// Column names.
    fn header(&self) -> &'static [&'static str];

    /// One entry per row, each with as many cells as there are columns.
    fn rows(&self) -> Vec<Vec<String>>;
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl Discipline {
    pub const ALL: [Discipline; 5] = [
        Discipline::Rtt,
        Discipline::Throughput,
        Discipline::Jitter,
        Discipline::Integrity,
        Discipline::FrameSize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Discipline::Rtt => "rtt",
            Discipline::Throughput => "throughput",
            Discipline::Jitter => "jitter",
            Discipline::Integrity => "integrity",
            Discipline::FrameSize => "frame-size",
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Discipline {
    type Err = Fail;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Discipline::ALL.iter().find(|discipline| discipline.name() == s) {
            Some(discipline) => Ok(*discipline),
            None => {
                let cause: String = format!("unknown discipline {:?}", s);
                Err(Fail::new(EINVAL, &cause))
            },
        }
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Converts a duration to fractional milliseconds.
pub(crate) fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================

#[cfg(test)]
mod tests {
    use super::Discipline;
    use ::anyhow::Result;

    #[test]
    fn test_discipline_names_round_trip() -> Result<()> {
        for discipline in Discipline::ALL {
            assert_eq!(discipline.name().parse::<Discipline>()?, discipline);
        }
        assert!("latency".parse::<Discipline>().is_err());
        Ok(())
    }
}
