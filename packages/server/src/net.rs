use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use tracing::warn;

/// Public address used only to pick the outbound interface; no packet is sent.
const PROBE_TARGET: &str = "8.8.8.8:80";

/// The host's LAN address, or `127.0.0.1` if it cannot be determined.
pub fn resolve_local_address() -> IpAddr {
    resolve_via(PROBE_TARGET)
}

pub(crate) fn resolve_via(target: &str) -> IpAddr {
    match probe_local_address(target) {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(ip) => {
            warn!(%ip, "Local address lookup returned an unspecified address, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
        Err(e) => {
            warn!(error = %e, "Failed to resolve local IP address, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// "Connect" a UDP socket so the OS picks a route, then read back its local end.
fn probe_local_address(target: &str) -> io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(target)?;
    Ok(socket.local_addr()?.ip())
}

/// `http://<ip>:<port>`, bracketing IPv6 addresses.
pub fn share_url(ip: IpAddr, port: u16) -> String {
    format!("http://{}", SocketAddr::new(ip, port))
}
