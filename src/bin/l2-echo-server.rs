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
use ::l2probe::EtherType2;

//==============================================================================
// Program Arguments
//==============================================================================

/// Program Arguments
#[derive(Debug)]
struct ProgramArguments {
    /// Local network interface.
    interface_name: Option<String>,
    /// EtherType of the frames to echo.
    ether_type: Option<EtherType2>,
    /// Configuration file.
    config_path: Option<String>,
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
                    .help("Sets the network interface to listen on"),
            )
            .arg(
                Arg::new("ethertype")
                    .long("ethertype")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("HEX")
                    .help("Sets the EtherType to echo (default 0x88B5)"),
            )
            .arg(
                Arg::new("config")
                    .long("config")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("FILE")
                    .help("Sets the configuration file"),
            )
            .get_matches();

        let mut args: ProgramArguments = ProgramArguments {
            interface_name: matches.get_one::<String>("interface").cloned(),
            ether_type: None,
            config_path: matches.get_one::<String>("config").cloned(),
        };

        if let Some(ether_type) = matches.get_one::<String>("ethertype") {
            args.ether_type = Some(ether_type.parse()?);
        }

        Ok(args)
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
        Config,
        EchoResponder,
    };

    logging::initialize("info");
    let args: ProgramArguments = ProgramArguments::new(
        "l2-echo-server",
        "Microsoft Corporation",
        "Echoes raw Ethernet frames of one EtherType back to their sender.",
    )?;

    let config: Config = match args.config_path.as_deref() {
        Some(config_path) => Config::new(config_path)?,
        None => Config::default(),
    };
    let interface_name: String = match args.interface_name {
        Some(interface_name) => interface_name,
        None => match config.interface_name()? {
            Some(interface_name) => interface_name,
            None => anyhow::bail!("no network interface given (use --interface)"),
        },
    };
    let ether_type: EtherType2 = match args.ether_type {
        Some(ether_type) => ether_type,
        None => config.ether_type()?,
    };

    // Tagged and untagged frames must both reach the responder.
    let layer: LinuxRawLayer = LinuxRawLayer::new(&interface_name, None)?;
    info!(
        "echo server running on {} ({}), EtherType {}",
        interface_name,
        layer.link_addr(),
        ether_type
    );

    EchoResponder::new(layer, ether_type).run()
}

#[cfg(not(target_os = "linux"))]
fn main() -> Result<()> {
    anyhow::bail!("raw sockets are only supported on Linux")
}
