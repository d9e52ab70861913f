//! MAC address enrichment from the operating system's ARP table, plus OUI
//! vendor resolution.
//!
//! Both lookups are best effort: a missing ARP entry or a failed database
//! load simply leaves the fields empty, never failing the scan.

use std::net::Ipv4Addr;
use std::sync::OnceLock;

use mac_oui::Oui;
use tracing::debug;

static OUI_DB: OnceLock<Option<Oui>> = OnceLock::new();

fn oui_db() -> Option<&'static Oui> {
    OUI_DB
        .get_or_init(|| match Oui::default() {
            Ok(db) => Some(db),
            Err(e) => {
                debug!("OUI database unavailable: {e}");
                None
            }
        })
        .as_ref()
}

/// Resolve the vendor name behind a MAC address prefix.
pub fn vendor_for(mac: &str) -> Option<String> {
    let db = oui_db()?;
    match db.lookup_by_mac(mac) {
        Ok(Some(entry)) => Some(entry.company_name.clone()),
        _ => None,
    }
}

/// Look up the MAC address the OS has cached for `addr`.
///
/// Only hosts on the local subnet ever appear here; routed targets have no
/// ARP entry and return `None`.
#[cfg(target_os = "linux")]
pub fn arp_lookup(addr: Ipv4Addr) -> Option<String> {
    let table = std::fs::read_to_string("/proc/net/arp").ok()?;
    let needle = addr.to_string();

    // /proc/net/arp: IP, HW type, flags, HW address, mask, device.
    for line in table.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() >= 4 && fields[0] == needle {
            let mac = fields[3];
            // Incomplete entries show up as all zeroes.
            if mac != "00:00:00:00:00:00" {
                return Some(mac.to_string());
            }
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
pub fn arp_lookup(_addr: Ipv4Addr) -> Option<String> {
    None
}
