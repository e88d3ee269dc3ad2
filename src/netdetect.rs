use if_addrs::{get_if_addrs, IfAddr};
use ipnet::{IpNet, Ipv4Net};
use std::iter::FusedIterator;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::{Result, SweepError};

/// Reserved subnet request meaning "the network this host is attached to".
pub const LOCAL_SUBNET: &str = "local";

/// Resolve a subnet request into the network to sweep.
///
/// `local` (any case) selects the first non-loopback IPv4 interface network;
/// anything else must be CIDR notation such as `192.168.1.0/24`. The returned
/// network is truncated to its base address.
pub fn resolve_subnet(request: &str) -> Result<IpNet> {
    if request.eq_ignore_ascii_case(LOCAL_SUBNET) {
        return Ok(IpNet::V4(local_interface_network()?.trunc()));
    }
    let net: IpNet = request.parse().map_err(|source| SweepError::InvalidCidr {
        input: request.to_string(),
        source,
    })?;
    Ok(net.trunc())
}

/// The local subnet in CIDR form, keeping the interface address,
/// e.g. `192.168.1.42/24`.
pub fn resolve_local_subnet() -> Result<String> {
    Ok(local_interface_network()?.to_string())
}

fn local_interface_network() -> Result<Ipv4Net> {
    let ifaces = get_if_addrs().map_err(SweepError::Interfaces)?;
    let addrs = ifaces.into_iter().map(|iface| match iface.addr {
        IfAddr::V4(v4) => (IpAddr::V4(v4.ip), IpAddr::V4(v4.netmask)),
        IfAddr::V6(v6) => (IpAddr::V6(v6.ip), IpAddr::V6(v6.netmask)),
    });
    first_ipv4_network(addrs).ok_or(SweepError::NoLocalNetwork)
}

/// Pick the first non-loopback IPv4 `(address, netmask)` pair, in the order
/// the interfaces were reported.
pub fn first_ipv4_network<I>(addrs: I) -> Option<Ipv4Net>
where
    I: IntoIterator<Item = (IpAddr, IpAddr)>,
{
    addrs.into_iter().find_map(|(ip, mask)| match (ip, mask) {
        (IpAddr::V4(ip), IpAddr::V4(mask)) if !ip.is_loopback() => {
            Ipv4Net::with_netmask(ip, mask).ok()
        }
        _ => None,
    })
}

/// Every address in `subnet`, network and broadcast included, in ascending
/// order. The sequence is produced lazily.
pub fn enumerate_hosts(subnet: IpNet) -> Hosts {
    match subnet {
        IpNet::V4(n) => Hosts {
            next: Some(u128::from(u32::from(n.network()))),
            last: u128::from(u32::from(n.broadcast())),
            v4: true,
        },
        IpNet::V6(n) => Hosts {
            next: Some(u128::from(n.network())),
            last: u128::from(n.broadcast()),
            v4: false,
        },
    }
}

/// Iterator returned by [`enumerate_hosts`].
#[derive(Debug, Clone)]
pub struct Hosts {
    next: Option<u128>,
    last: u128,
    v4: bool,
}

impl Iterator for Hosts {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        let cur = self.next?;
        self.next = if cur < self.last { Some(cur + 1) } else { None };
        let ip = if self.v4 {
            IpAddr::V4(Ipv4Addr::from(cur as u32))
        } else {
            IpAddr::V6(Ipv6Addr::from(cur))
        };
        Some(ip)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            None => (0, Some(0)),
            Some(cur) => match usize::try_from(self.last - cur).ok().and_then(|n| n.checked_add(1)) {
                Some(n) => (n, Some(n)),
                None => (usize::MAX, None),
            },
        }
    }
}

impl FusedIterator for Hosts {}
