//! # Target Expansion
//!
//! Turns a CIDR specification into the ordered sequence of candidate host
//! addresses. The sequence is lazy and restartable: a `/8` expands to ~16M
//! addresses without ever materializing them, and every call to
//! [`HostAddrs::iter`] yields an identical ascending sequence.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::ScanError;

/// An expanded IPv4 network: the base address masked to `prefix` bits.
///
/// For prefixes shorter than /31 the network and broadcast addresses are
/// excluded from iteration; /31 and /32 keep every address (point-to-point
/// and single-host semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostAddrs {
    network: u32,
    prefix: u8,
}

impl HostAddrs {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, ScanError> {
        if prefix > 32 {
            return Err(ScanError::invalid_range(
                format!("{addr}/{prefix}"),
                "prefix length must be within 0-32",
            ));
        }
        let mask: u32 = match prefix {
            0 => 0,
            p => u32::MAX << (32 - p),
        };
        Ok(Self {
            network: u32::from(addr) & mask,
            prefix,
        })
    }

    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Number of candidate host addresses the iterator will yield.
    pub fn len(&self) -> u64 {
        let block: u64 = 1 << (32 - u64::from(self.prefix));
        if self.prefix < 31 { block - 2 } else { block }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazy ascending walk over the candidate addresses.
    pub fn iter(self) -> impl Iterator<Item = Ipv4Addr> {
        // u64 bounds so a /0 block does not overflow u32 arithmetic.
        let first = u64::from(self.network);
        let last = first + (1 << (32 - u64::from(self.prefix))) - 1;
        let (start, end) = if self.prefix < 31 {
            (first + 1, last - 1)
        } else {
            (first, last)
        };
        (start..=end).map(|ip| Ipv4Addr::from(ip as u32))
    }
}

impl fmt::Display for HostAddrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix)
    }
}

impl FromStr for HostAddrs {
    type Err = ScanError;

    /// Parses `"a.b.c.d/p"`; a bare address is treated as a /32.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, prefix_str) = match s.split_once('/') {
            Some(parts) => parts,
            None => (s, "32"),
        };

        let addr: Ipv4Addr = addr_str
            .parse()
            .map_err(|e| ScanError::invalid_range(s, format!("bad address: {e}")))?;
        let prefix: u8 = prefix_str
            .parse()
            .map_err(|e| ScanError::invalid_range(s, format!("bad prefix: {e}")))?;

        Self::new(addr, prefix)
    }
}
