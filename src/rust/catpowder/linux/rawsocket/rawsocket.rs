// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use super::RawSocketAddr;
use crate::runtime::fail::Fail;
use ::libc::{
    EACCES,
    EPERM,
};
use ::socket2::{
    Domain,
    Protocol,
    Socket,
    Type,
};
use ::std::{
    io,
    mem::{
        self,
        MaybeUninit,
    },
    os::unix::io::AsRawFd,
    ptr,
    time::Duration,
};

//======================================================================================================================
// Constants & Structures
//======================================================================================================================

/// Shortest read timeout handed to the kernel. A zero timeout would mean "block forever".
const MIN_READ_TIMEOUT: Duration = Duration::from_micros(1);

/// Socket option that attaches a [AuxData] control message to every frame (see `linux/if_packet.h`).
const PACKET_AUXDATA: libc::c_int = 8;
/// `tp_vlan_tci` holds a tag the kernel took off the frame.
const TP_STATUS_VLAN_VALID: u32 = 1 << 4;
/// `tp_vlan_tpid` is filled in.
const TP_STATUS_VLAN_TPID_VALID: u32 = 1 << 6;
/// Tag protocol identifier assumed when the kernel does not report one.
const TPID_8021Q: u16 = 0x8100;

/// Room for one [AuxData] control message, in 8-byte words to keep the buffer aligned for `cmsghdr`.
const CONTROL_WORDS: usize = 8;

/// Mirror of `struct tpacket_auxdata`.
#[allow(dead_code)]
#[repr(C)]
#[derive(Clone, Copy, Default)]
struct AuxData {
    tp_status: u32,
    tp_len: u32,
    tp_snaplen: u32,
    tp_mac: u16,
    tp_net: u16,
    tp_vlan_tci: u16,
    tp_vlan_tpid: u16,
}

/// 802.1Q tag stripped by the kernel before the frame reached the socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrippedTag {
    pub tpid: u16,
    pub tci: u16,
}

/// A frame read off a raw socket.
pub struct RawReception {
    pub nbytes: usize,
    pub origin_addr: RawSocketAddr,
    pub stripped_tag: Option<StrippedTag>,
}

/// Raw socket.
pub struct RawSocket {
    socket: Socket,
    /// Read timeout currently installed on the socket.
    read_timeout: Option<Duration>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

/// Associated functions for raw sockets.
impl RawSocket {
    /// Creates a raw packet socket that receives frames of `protocol` (host byte order).
    ///
    /// The socket asks the kernel for packet metadata, so that VLAN tags removed by offloading can be put back.
    pub fn new(protocol: u16) -> Result<Self, Fail> {
        let protocol: Protocol = Protocol::from(protocol.to_be() as libc::c_int);
        let socket: Socket = match Socket::new(Domain::PACKET, Type::RAW, Some(protocol)) {
            Ok(socket) => socket,
            Err(e) => match e.raw_os_error() {
                Some(EPERM) | Some(EACCES) => {
                    return Err(Fail::new(
                        EPERM,
                        "permission denied: raw sockets require CAP_NET_RAW (run as root)",
                    ))
                },
                _ => return Err(Fail::from(e)),
            },
        };

        let enable: libc::c_int = 1;
        let ret: libc::c_int = unsafe {
            libc::setsockopt(
                socket.as_raw_fd(),
                libc::SOL_PACKET,
                PACKET_AUXDATA,
                &enable as *const libc::c_int as *const libc::c_void,
                mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if ret != 0 {
            return Err(Fail::from(io::Error::last_os_error()));
        }

        Ok(Self {
            socket,
            read_timeout: None,
        })
    }

    /// Binds a socket to a raw address.
    pub fn bind(&self, addr: &RawSocketAddr) -> Result<(), Fail> {
        self.socket.bind(&addr.to_sockaddr())?;
        Ok(())
    }

    /// Sends data through a raw socket.
    pub fn sendto(&self, buf: &[u8], rawaddr: &RawSocketAddr) -> Result<usize, Fail> {
        Ok(self.socket.send_to(buf, &rawaddr.to_sockaddr())?)
    }

    /// Receives a frame from a raw socket, waiting for at most `timeout` (forever if `None`).
    ///
    /// Returns `Ok(None)` if the wait expired or was interrupted.
    pub fn recvmsg(
        &mut self,
        buf: &mut [MaybeUninit<u8>],
        timeout: Option<Duration>,
    ) -> Result<Option<RawReception>, Fail> {
        self.set_read_timeout(timeout)?;

        let mut sll: libc::sockaddr_ll = unsafe { mem::zeroed() };
        let mut control: [u64; CONTROL_WORDS] = [0; CONTROL_WORDS];
        let mut iov: libc::iovec = libc::iovec {
            iov_base: buf.as_mut_ptr() as *mut libc::c_void,
            iov_len: buf.len(),
        };
        let mut msg: libc::msghdr = unsafe { mem::zeroed() };
        msg.msg_name = &mut sll as *mut libc::sockaddr_ll as *mut libc::c_void;
        msg.msg_namelen = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;
        msg.msg_iov = &mut iov;
        msg.msg_iovlen = 1;
        msg.msg_control = control.as_mut_ptr() as *mut libc::c_void;
        msg.msg_controllen = mem::size_of_val(&control) as _;

        let nbytes: isize = unsafe { libc::recvmsg(self.socket.as_raw_fd(), &mut msg, 0) };
        if nbytes < 0 {
            let e: io::Error = io::Error::last_os_error();
            return match e.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted => Ok(None),
                _ => Err(Fail::from(e)),
            };
        }

        Ok(Some(RawReception {
            nbytes: nbytes as usize,
            origin_addr: RawSocketAddr::from_raw(sll),
            stripped_tag: unsafe { stripped_tag(&msg) },
        }))
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), Fail> {
        let timeout: Option<Duration> = timeout.map(|t| t.max(MIN_READ_TIMEOUT));
        if self.read_timeout != timeout {
            self.socket.set_read_timeout(timeout)?;
            self.read_timeout = timeout;
        }
        Ok(())
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Looks for a `PACKET_AUXDATA` control message in `msg` and returns the VLAN tag it reports, if any.
///
/// # Safety
///
/// `msg` must describe a control buffer filled in by `recvmsg`.
unsafe fn stripped_tag(msg: &libc::msghdr) -> Option<StrippedTag> {
    let mut cmsg: *mut libc::cmsghdr = libc::CMSG_FIRSTHDR(msg);
    while !cmsg.is_null() {
        if (*cmsg).cmsg_level == libc::SOL_PACKET
            && (*cmsg).cmsg_type == PACKET_AUXDATA
            && (*cmsg).cmsg_len as usize >= libc::CMSG_LEN(mem::size_of::<AuxData>() as u32) as usize
        {
            let aux: AuxData = ptr::read_unaligned(libc::CMSG_DATA(cmsg) as *const AuxData);
            if aux.tp_status & TP_STATUS_VLAN_VALID == 0 {
                return None;
            }
            let tpid: u16 = if aux.tp_status & TP_STATUS_VLAN_TPID_VALID != 0 {
                aux.tp_vlan_tpid
            } else {
                TPID_8021Q
            };
            return Some(StrippedTag {
                tpid,
                tci: aux.tp_vlan_tci,
            });
        }
        cmsg = libc::CMSG_NXTHDR(msg, cmsg);
    }
    None
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
