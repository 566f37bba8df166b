// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::{
    fail::Fail,
    network::types::MacAddress,
};
use ::libc::{
    EACCES,
    ENODEV,
    ENXIO,
    EPERM,
};
use ::socket2::{
    Domain,
    Socket,
    Type,
};
use ::std::{
    fs,
    io,
    mem,
    os::fd::AsRawFd,
};

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Gets the interface index of the network interface named `ifname`.
pub fn get_ifindex(ifname: &str) -> Result<i32, Fail> {
    check_ifname(ifname)?;
    let path: String = format!("/sys/class/net/{}/ifindex", ifname);
    let contents: String = fs::read_to_string(path).map_err(|e| translate(ifname, e))?;
    match contents.trim().parse() {
        Ok(ifindex) => Ok(ifindex),
        Err(_) => Err(Fail::new(ENODEV, "could not parse interface index")),
    }
}

/// Queries the current hardware address of the network interface named `ifname`.
pub fn get_link_addr(ifname: &str) -> Result<MacAddress, Fail> {
    check_ifname(ifname)?;
    let socket: Socket = Socket::new(Domain::IPV4, Type::DGRAM, None).map_err(|e| translate(ifname, e))?;

    let mut ifr: libc::ifreq = unsafe { mem::zeroed() };
    for (dst, src) in ifr.ifr_name.iter_mut().zip(ifname.as_bytes()) {
        *dst = *src as libc::c_char;
    }

    let ret: libc::c_int = unsafe { libc::ioctl(socket.as_raw_fd(), libc::SIOCGIFHWADDR as _, &mut ifr) };
    if ret == -1 {
        return Err(translate(ifname, io::Error::last_os_error()));
    }

    let sa_data: [libc::c_char; 14] = unsafe { ifr.ifr_ifru.ifru_hwaddr.sa_data };
    let mut octets: [u8; 6] = [0; 6];
    for (dst, src) in octets.iter_mut().zip(sa_data.iter()) {
        *dst = *src as u8;
    }
    let link_addr: MacAddress = MacAddress::new(octets);
    debug!("get_link_addr(): ifname={:?} link_addr={}", ifname, link_addr);
    Ok(link_addr)
}

/// Interface names must fit in `IFNAMSIZ` (including the terminator) and must not contain path separators.
fn check_ifname(ifname: &str) -> Result<(), Fail> {
    if ifname.is_empty() || ifname.len() >= libc::IFNAMSIZ || ifname.contains('/') {
        let cause: String = format!("invalid interface name {:?}", ifname);
        return Err(Fail::new(ENODEV, &cause));
    }
    Ok(())
}

/// Maps OS errors onto the two failures callers care about: missing interface and missing privileges.
fn translate(ifname: &str, e: io::Error) -> Fail {
    match (e.kind(), e.raw_os_error()) {
        (io::ErrorKind::NotFound, _) | (_, Some(ENODEV)) | (_, Some(ENXIO)) => {
            let cause: String = format!("interface {:?} not found", ifname);
            Fail::new(ENODEV, &cause)
        },
        (io::ErrorKind::PermissionDenied, _) | (_, Some(EPERM)) | (_, Some(EACCES)) => {
            let cause: String = format!("permission denied while querying interface {:?}", ifname);
            Fail::new(EPERM, &cause)
        },
        _ => Fail::from(e),
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
