//! Static port tables: the quick-scan set, banner-friendly ports and the
//! well-known service names used as the baseline for service labelling.

/// The 17 well-known ports probed by the `quick` and `stealth` profiles.
pub const QUICK_PORTS: [u16; 17] = [
    21, 22, 23, 25, 53, 80, 110, 135, 139, 143, 443, 993, 995, 1723, 3389, 5900, 8080,
];

/// Ports whose services commonly announce themselves with a text banner.
pub const BANNER_PORTS: [u16; 6] = [21, 22, 25, 80, 110, 143];

/// Ports tried by the TCP liveness fallback when ICMP is unavailable.
/// A refusal on any of them still proves the host is up.
pub const LIVENESS_FALLBACK_PORTS: [u16; 3] = [80, 443, 22];

/// Baseline service label for a well-known port.
///
/// Banner-derived evidence overrides this table during classification; for
/// ports absent here and without a banner the service stays unlabelled.
pub fn service_name(port: u16) -> Option<&'static str> {
    let name = match port {
        21 => "ftp",
        22 => "ssh",
        23 => "telnet",
        25 => "smtp",
        53 => "dns",
        80 => "http",
        110 => "pop3",
        135 => "msrpc",
        139 => "netbios-ssn",
        143 => "imap",
        443 => "https",
        445 => "microsoft-ds",
        548 => "afp",
        631 => "ipp",
        993 => "imaps",
        995 => "pop3s",
        1723 => "pptp",
        3306 => "mysql",
        3389 => "rdp",
        5432 => "postgresql",
        5900 => "vnc",
        6379 => "redis",
        8000 | 8080 => "http-alt",
        8443 => "https-alt",
        _ => return None,
    };
    Some(name)
}
