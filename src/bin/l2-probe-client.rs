// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]

#[macro_use]
extern crate log;

//==============================================================================
// Imports
//==============================================================================

use ::anyhow::Result;
use ::clap::{
    Arg,
    ArgMatches,
    Command,
};
use ::l2probe::{
    disciplines::{
        run_frame_size,
        run_integrity,
        run_jitter,
        run_rtt,
        run_throughput,
        Discipline,
        FrameSizeParams,
        IntegrityParams,
        JitterParams,
        RttParams,
        RttReport,
        ThroughputParams,
    },
    sink::{
        CsvSink,
        ResultSink,
    },
    Config,
    EtherType2,
    MacAddress,
    PhysicalLayer,
    ProbeEngine,
    Session,
};
use ::std::{
    path::PathBuf,
    time::Duration,
};

//==============================================================================
// Program Arguments
//==============================================================================

/// Program Arguments
#[derive(Debug, Default)]
struct ProgramArguments {
    interface_name: Option<String>,
    /// Link address of the echo server.
    peer_addr: Option<MacAddress>,
    ether_type: Option<EtherType2>,
    vlan_id: Option<u16>,
    probe_timeout: Option<Duration>,
    /// Fixed probe payload.
    payload: Option<String>,
    output_dir: Option<PathBuf>,
    config_path: Option<String>,
    /// Disciplines to run, in order.
    disciplines: Vec<Discipline>,
    count: Option<usize>,
    interval: Option<Duration>,
    duration: Option<Duration>,
    sizes: Option<Vec<usize>>,
}

/// Associate functions for Program Arguments
impl ProgramArguments {
    /// Parses the program arguments from the command line interface.
    pub fn new(app_name: &'static str, app_author: &'static str, app_about: &'static str) -> Result<Self> {
        let matches: ArgMatches = Command::new(app_name)
            .author(app_author)
            .about(app_about)
            .arg(
                Arg::new("interface")
                    .long("interface")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("IFNAME")
                    .help("Sets the network interface to probe from"),
            )
            .arg(
                Arg::new("peer")
                    .long("peer")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("MAC")
                    .help("Sets the link address of the echo server"),
            )
            .arg(
                Arg::new("ethertype")
                    .long("ethertype")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("HEX")
                    .help("Sets the EtherType of probe frames (default 0x88B5)"),
            )
            .arg(
                Arg::new("vlan")
                    .long("vlan")
                    .value_parser(clap::value_parser!(u16).range(0..=4095))
                    .required(false)
                    .value_name("ID")
                    .help("Tags probe frames with a VLAN id"),
            )
            .arg(
                Arg::new("timeout-ms")
                    .long("timeout-ms")
                    .value_parser(clap::value_parser!(u64))
                    .required(false)
                    .value_name("MILLISECONDS")
                    .help("Sets the per-probe timeout"),
            )
            .arg(
                Arg::new("payload")
                    .long("payload")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("TEXT")
                    .help("Sends a fixed payload instead of random bytes"),
            )
            .arg(
                Arg::new("output-dir")
                    .long("output-dir")
                    .value_parser(clap::value_parser!(PathBuf))
                    .required(false)
                    .value_name("DIR")
                    .help("Sets the directory for result files"),
            )
            .arg(
                Arg::new("config")
                    .long("config")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("FILE")
                    .help("Sets the configuration file"),
            )
            .arg(
                Arg::new("discipline")
                    .value_parser(["rtt", "throughput", "jitter", "integrity", "frame-size", "all"])
                    .required(true)
                    .value_name("TEST")
                    .help("Selects the measurement to run"),
            )
            .arg(
                Arg::new("count")
                    .long("count")
                    .value_parser(clap::value_parser!(usize))
                    .required(false)
                    .value_name("N")
                    .help("Sets the number of probes (rtt, jitter, integrity)"),
            )
            .arg(
                Arg::new("interval-ms")
                    .long("interval-ms")
                    .value_parser(clap::value_parser!(u64))
                    .required(false)
                    .value_name("MILLISECONDS")
                    .help("Sets the delay between probes (rtt, jitter)"),
            )
            .arg(
                Arg::new("duration-ms")
                    .long("duration-ms")
                    .value_parser(clap::value_parser!(u64))
                    .required(false)
                    .value_name("MILLISECONDS")
                    .help("Sets the test duration (throughput)"),
            )
            .arg(
                Arg::new("sizes")
                    .long("sizes")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("SIZES")
                    .help("Sets a comma-separated list of payload sizes (frame-size)"),
            )
            .get_matches();

        let mut args: ProgramArguments = ProgramArguments {
            interface_name: matches.get_one::<String>("interface").cloned(),
            vlan_id: matches.get_one::<u16>("vlan").copied(),
            probe_timeout: matches.get_one::<u64>("timeout-ms").copied().map(Duration::from_millis),
            payload: matches.get_one::<String>("payload").cloned(),
            output_dir: matches.get_one::<PathBuf>("output-dir").cloned(),
            config_path: matches.get_one::<String>("config").cloned(),
            count: matches.get_one::<usize>("count").copied(),
            interval: matches.get_one::<u64>("interval-ms").copied().map(Duration::from_millis),
            duration: matches.get_one::<u64>("duration-ms").copied().map(Duration::from_millis),
            ..Default::default()
        };

        if let Some(addr) = matches.get_one::<String>("peer") {
            args.peer_addr = Some(MacAddress::parse_canonical_str(addr)?);
        }
        if let Some(ether_type) = matches.get_one::<String>("ethertype") {
            args.ether_type = Some(ether_type.parse()?);
        }
        if let Some(sizes) = matches.get_one::<String>("sizes") {
            args.set_sizes(sizes)?;
        }
        if let Some(discipline) = matches.get_one::<String>("discipline") {
            args.disciplines = match discipline.as_str() {
                "all" => Discipline::ALL.to_vec(),
                name => vec![name.parse()?],
            };
        }

        Ok(args)
    }

    fn set_sizes(&mut self, sizes: &str) -> Result<()> {
        let mut parsed: Vec<usize> = Vec::new();
        for size in sizes.split(',') {
            match size.trim().parse::<usize>() {
                Ok(size) => parsed.push(size),
                Err(_) => anyhow::bail!("invalid payload size {:?}", size),
            }
        }
        self.sizes = Some(parsed);
        Ok(())
    }
}

//==============================================================================
// Application
//==============================================================================

/// Application
struct Application<L: PhysicalLayer> {
    engine: ProbeEngine<L>,
    session: Session,
    sink: CsvSink,
    rtt: RttParams,
    throughput: ThroughputParams,
    jitter: JitterParams,
    integrity: IntegrityParams,
    frame_size: FrameSizeParams,
}

/// Associate functions for Application
impl<L: PhysicalLayer> Application<L> {
    /// Applies command line overrides on top of the configured discipline parameters.
    pub fn new(engine: ProbeEngine<L>, session: Session, config: &Config, args: &ProgramArguments) -> Result<Self> {
        let output_dir: PathBuf = match args.output_dir.clone() {
            Some(output_dir) => output_dir,
            None => config.output_dir()?,
        };

        let mut rtt: RttParams = config.rtt_params()?;
        let mut throughput: ThroughputParams = config.throughput_params()?;
        let mut jitter: JitterParams = config.jitter_params()?;
        let mut integrity: IntegrityParams = config.integrity_params()?;
        let mut frame_size: FrameSizeParams = config.frame_size_params()?;
        if let Some(count) = args.count {
            rtt.count = count;
            jitter.count = count;
            integrity.count = count;
        }
        if let Some(interval) = args.interval {
            rtt.interval = interval;
            jitter.interval = interval;
        }
        if let Some(duration) = args.duration {
            throughput.duration = duration;
        }
        if let Some(sizes) = args.sizes.clone() {
            frame_size.sizes = sizes;
        }

        Ok(Self {
            engine,
            session,
            sink: CsvSink::new(&output_dir)?,
            rtt,
            throughput,
            jitter,
            integrity,
            frame_size,
        })
    }

    pub fn run(&mut self, disciplines: &[Discipline]) -> Result<()> {
        for discipline in disciplines {
            match discipline {
                Discipline::Rtt => {
                    let report: RttReport = run_rtt(&mut self.engine, &self.session, &self.rtt)?;
                    Self::summarize(&report);
                    self.sink.write_report(&report)?;
                },
                Discipline::Throughput => {
                    let report = run_throughput(&mut self.engine, &self.session, &self.throughput)?;
                    self.sink.write_report(&report)?;
                },
                Discipline::Jitter => {
                    let report = run_jitter(&mut self.engine, &self.session, &self.jitter)?;
                    self.sink.write_report(&report)?;
                },
                Discipline::Integrity => {
                    let report = run_integrity(&mut self.engine, &self.session, &self.integrity)?;
                    self.sink.write_report(&report)?;
                },
                Discipline::FrameSize => {
                    let report = run_frame_size(&mut self.engine, &self.session, &self.frame_size)?;
                    self.sink.write_report(&report)?;
                },
            }
        }
        Ok(())
    }

    fn summarize(report: &RttReport) {
        info!(
            "{} probes sent, {} received, {:.1}% loss",
            report.sent(),
            report.received(),
            report.loss_percent()
        );
        if let (Some(min), Some(avg), Some(max)) = (report.min(), report.avg(), report.max()) {
            info!(
                "rtt min/avg/max = {:.3}/{:.3}/{:.3} ms",
                min.as_secs_f64() * 1000.0,
                avg.as_secs_f64() * 1000.0,
                max.as_secs_f64() * 1000.0
            );
        }
    }
}

//==============================================================================
// main
//==============================================================================

/// Drives the application.
#[cfg(target_os = "linux")]
fn main() -> Result<()> {
    use ::l2probe::{
        catpowder::LinuxRawLayer,
        runtime::logging,
        PayloadGenerator,
    };

    logging::initialize("info");
    let args: ProgramArguments = ProgramArguments::new(
        "l2-probe-client",
        "Microsoft Corporation",
        "Measures a layer 2 path against an echo server.",
    )?;

    let config: Config = match args.config_path.as_deref() {
        Some(config_path) => Config::new(config_path)?,
        None => Config::default(),
    };
    let interface_name: String = match args.interface_name.clone() {
        Some(interface_name) => interface_name,
        None => match config.interface_name()? {
            Some(interface_name) => interface_name,
            None => anyhow::bail!("no network interface given (use --interface)"),
        },
    };
    let peer_addr: MacAddress = match args.peer_addr {
        Some(peer_addr) => peer_addr,
        None => match config.peer_link_addr()? {
            Some(peer_addr) => peer_addr,
            None => anyhow::bail!("no peer link address given (use --peer)"),
        },
    };
    let ether_type: EtherType2 = match args.ether_type {
        Some(ether_type) => ether_type,
        None => config.ether_type()?,
    };
    let vlan_id: Option<u16> = match args.vlan_id {
        Some(vlan_id) => Some(vlan_id),
        None => config.vlan_id()?,
    };
    let probe_timeout: Duration = match args.probe_timeout {
        Some(probe_timeout) => probe_timeout,
        None => config.probe_timeout()?,
    };
    let payload: PayloadGenerator = match args.payload.clone() {
        Some(payload) => PayloadGenerator::Fixed(payload.into_bytes()),
        None => config.payload()?,
    };

    // Tagged replies carry the VLAN TPID in the outer EtherType field.
    let filter: Option<EtherType2> = if vlan_id.is_some() { None } else { Some(ether_type) };
    let layer: LinuxRawLayer = LinuxRawLayer::new(&interface_name, filter)?;
    let session: Session = Session::new(&interface_name, layer.link_addr(), peer_addr, ether_type, vlan_id)?
        .with_payload(payload)
        .with_probe_timeout(probe_timeout);
    info!(
        "probing {} from {} ({}), EtherType {}, VLAN {:?}, timeout {} ms",
        session.peer_addr(),
        session.interface_name(),
        session.local_addr(),
        session.ether_type(),
        session.vlan_id(),
        session.probe_timeout().as_millis()
    );

    let engine: ProbeEngine<LinuxRawLayer> = ProbeEngine::new(layer, session.probe_timeout());
    Application::new(engine, session, &config, &args)?.run(&args.disciplines)
}

#[cfg(not(target_os = "linux"))]
fn main() -> Result<()> {
    anyhow::bail!("raw sockets are only supported on Linux")
}
