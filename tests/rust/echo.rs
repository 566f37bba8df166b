// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod common;

//==============================================================================
// Imports
//==============================================================================

use ::anyhow::Result;
use ::l2probe::{
    disciplines::{
        run_frame_size,
        run_integrity,
        run_rtt,
        run_throughput,
        FrameSizeParams,
        FrameSizeReport,
        IntegrityParams,
        IntegrityReport,
        RttParams,
        RttReport,
        ThroughputParams,
        ThroughputReport,
    },
    echo::EchoStats,
    runtime::logging,
    EchoResponder,
    EtherType2,
    PayloadGenerator,
    ProbeEngine,
    Session,
};
use ::std::{
    thread::{
        self,
        JoinHandle,
    },
    time::Duration,
};
use common::{
    ChannelLayer,
    ALICE_MAC,
    BOB_MAC,
};

//==============================================================================
// Constants
//==============================================================================

const PROBE_TIMEOUT: Duration = Duration::from_millis(200);
const SERVER_POLL_TIMEOUT: Duration = Duration::from_millis(10);

//==============================================================================
// Helpers
//==============================================================================

/// Runs an echo responder on `layer` until the other end goes away, then returns its counters.
fn spawn_server(layer: ChannelLayer, filter: EtherType2) -> JoinHandle<EchoStats> {
    thread::spawn(move || {
        let mut responder: EchoResponder<ChannelLayer> = EchoResponder::new(layer, filter);
        while responder.poll_once(Some(SERVER_POLL_TIMEOUT)).is_ok() {}
        responder.stats()
    })
}

fn client(layer: ChannelLayer, vlan_id: Option<u16>, timeout: Duration) -> Result<(ProbeEngine<ChannelLayer>, Session)> {
    logging::initialize("info");
    let session: Session = Session::new("chan0", ALICE_MAC, BOB_MAC, EtherType2::EXPERIMENTAL, vlan_id)?
        .with_probe_timeout(timeout);
    let engine: ProbeEngine<ChannelLayer> = ProbeEngine::new(layer, session.probe_timeout());
    Ok((engine, session))
}

fn join(server: JoinHandle<EchoStats>) -> Result<EchoStats> {
    match server.join() {
        Ok(stats) => Ok(stats),
        Err(_) => anyhow::bail!("echo server panicked"),
    }
}

//==============================================================================
// Tests
//==============================================================================

/// Runs the per-probe disciplines against an echo server.
#[test]
fn echo_untagged() -> Result<()> {
    let (alice, bob): (ChannelLayer, ChannelLayer) = ChannelLayer::pair();
    let server: JoinHandle<EchoStats> = spawn_server(bob, EtherType2::EXPERIMENTAL);
    let (mut engine, session): (ProbeEngine<ChannelLayer>, Session) = client(alice, None, PROBE_TIMEOUT)?;

    let rtt: RttReport = run_rtt(
        &mut engine,
        &session,
        &RttParams {
            count: 5,
            interval: Duration::from_millis(1),
            payload_size: 100,
        },
    )?;
    assert_eq!(rtt.received(), 5);
    assert_eq!(rtt.loss_percent(), 0.0);

    let integrity: IntegrityReport = run_integrity(
        &mut engine,
        &session,
        &IntegrityParams {
            count: 5,
            payload_size: 100,
        },
    )?;
    assert_eq!(integrity.sent(), 5);
    assert_eq!(integrity.errors(), 0);

    let frame_size: FrameSizeReport = run_frame_size(&mut engine, &session, &FrameSizeParams::default())?;
    let expected: Vec<(usize, usize)> = FrameSizeParams::default()
        .sizes
        .iter()
        .map(|size| (*size, size + 14))
        .collect();
    assert_eq!(frame_size.samples(), expected.as_slice());

    drop(engine);
    let stats: EchoStats = join(server)?;
    assert_eq!(stats.echoed, 16);
    assert_eq!(stats.ignored, 0);
    Ok(())
}

/// Tagged probes come back tagged with the same VLAN id.
#[test]
fn echo_tagged() -> Result<()> {
    let (alice, bob): (ChannelLayer, ChannelLayer) = ChannelLayer::pair();
    let server: JoinHandle<EchoStats> = spawn_server(bob, EtherType2::EXPERIMENTAL);
    let (mut engine, session): (ProbeEngine<ChannelLayer>, Session) = client(alice, Some(42), PROBE_TIMEOUT)?;
    let session: Session = session.with_payload(PayloadGenerator::Fixed(b"Hello, VLAN".to_vec()));

    let integrity: IntegrityReport = run_integrity(
        &mut engine,
        &session,
        &IntegrityParams {
            count: 3,
            payload_size: 0,
        },
    )?;
    assert_eq!(integrity.errors(), 0);

    let frame_size: FrameSizeReport = run_frame_size(&mut engine, &session, &FrameSizeParams { sizes: vec![200] })?;
    assert_eq!(frame_size.samples(), [(200, 218)]);

    drop(engine);
    assert_eq!(join(server)?.echoed, 4);
    Ok(())
}

/// A server filtering on another EtherType stays silent.
#[test]
fn echo_other_ether_type() -> Result<()> {
    let (alice, bob): (ChannelLayer, ChannelLayer) = ChannelLayer::pair();
    let server: JoinHandle<EchoStats> = spawn_server(bob, EtherType2::new(0x88b6));
    let (mut engine, session): (ProbeEngine<ChannelLayer>, Session) =
        client(alice, None, Duration::from_millis(20))?;

    let integrity: IntegrityReport = run_integrity(
        &mut engine,
        &session,
        &IntegrityParams {
            count: 3,
            payload_size: 64,
        },
    )?;
    assert_eq!(integrity.errors(), 3);
    assert_eq!(integrity.timed_out(), 3);

    drop(engine);
    let stats: EchoStats = join(server)?;
    assert_eq!(stats.echoed, 0);
    assert_eq!(stats.ignored, 3);
    Ok(())
}

/// Throughput counts the echoed frames.
#[test]
fn echo_throughput() -> Result<()> {
    let (alice, bob): (ChannelLayer, ChannelLayer) = ChannelLayer::pair();
    let server: JoinHandle<EchoStats> = spawn_server(bob, EtherType2::EXPERIMENTAL);
    let (mut engine, session): (ProbeEngine<ChannelLayer>, Session) = client(alice, None, PROBE_TIMEOUT)?;

    let throughput: ThroughputReport = run_throughput(
        &mut engine,
        &session,
        &ThroughputParams {
            duration: Duration::from_millis(100),
            payload_size: 500,
        },
    )?;
    assert!(throughput.sent() > 0);
    assert!(throughput.received() > 0);
    assert!(throughput.received() <= throughput.sent());
    assert!(throughput.bits_per_second() > 0.0);

    drop(engine);
    assert_eq!(join(server)?.received, throughput.sent());
    Ok(())
}
