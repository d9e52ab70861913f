//! # Fingerprint Classifier
//!
//! Pure, deterministic mapping from collected evidence (open ports, banners,
//! rtt, address suffix) to an OS/device label and per-port service labels.
//!
//! The rules live in a single ordered table evaluated first-match-wins.
//! Banner-derived evidence outranks multi-port signatures, which outrank
//! single-port guesses, which outrank address-suffix heuristics. Hosts
//! matching nothing are labelled "Unknown".

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use sweepr_common::ports::service_name;

/// Everything the classifier is allowed to look at. Borrowed, never mutated.
pub struct Evidence<'a> {
    pub addr: Ipv4Addr,
    pub open_ports: &'a [u16],
    pub banners: &'a BTreeMap<u16, String>,
    pub rtt: Option<Duration>,
    /// OUI vendor name, when ARP data was available.
    pub vendor: Option<&'a str>,
}

/// The classifier's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub device: String,
    pub services: BTreeMap<u16, String>,
}

/// Match predicate of a single signature rule.
enum Matcher {
    /// A banner on `port` (any port when `None`) contains the needle.
    Banner {
        port: Option<u16>,
        needle: &'static str,
    },
    /// Every listed port is open.
    AllPorts(&'static [u16]),
    /// At least one listed port is open.
    AnyPort(&'static [u16]),
    /// Gateway heuristic: one of the listed ports is open, few ports are
    /// open overall, and the address ends in a typical gateway suffix.
    Gateway {
        any: &'static [u16],
        max_open: usize,
    },
}

struct Rule {
    label: &'static str,
    matcher: Matcher,
}

impl Rule {
    fn matches(&self, ev: &Evidence<'_>) -> bool {
        match &self.matcher {
            Matcher::Banner { port, needle } => match port {
                Some(p) => ev
                    .banners
                    .get(p)
                    .is_some_and(|banner| banner.contains(needle)),
                None => ev.banners.values().any(|banner| banner.contains(needle)),
            },
            Matcher::AllPorts(ports) => {
                ports.iter().all(|p| ev.open_ports.binary_search(p).is_ok())
            }
            Matcher::AnyPort(ports) => {
                ports.iter().any(|p| ev.open_ports.binary_search(p).is_ok())
            }
            Matcher::Gateway { any, max_open } => {
                let suffix = ev.addr.octets()[3];
                (suffix == 1 || suffix == 254)
                    && ev.open_ports.len() < *max_open
                    && any.iter().any(|p| ev.open_ports.binary_search(p).is_ok())
            }
        }
    }
}

/// The signature table, highest priority first. Process-wide and immutable;
/// extending the rule set means adding an entry here, nothing else.
static RULES: &[Rule] = &[
    Rule {
        label: "Linux/Unix",
        matcher: Matcher::Banner {
            port: Some(22),
            needle: "OpenSSH",
        },
    },
    Rule {
        label: "Windows",
        matcher: Matcher::Banner {
            port: None,
            needle: "Microsoft",
        },
    },
    Rule {
        label: "Windows (RDP enabled)",
        matcher: Matcher::AllPorts(&[139, 445, 3389]),
    },
    Rule {
        label: "Windows",
        matcher: Matcher::AllPorts(&[139, 445]),
    },
    Rule {
        label: "Windows",
        matcher: Matcher::AllPorts(&[135, 139]),
    },
    Rule {
        label: "Windows (RDP enabled)",
        matcher: Matcher::AllPorts(&[3389]),
    },
    Rule {
        label: "Windows",
        matcher: Matcher::AnyPort(&[135, 139, 445]),
    },
    Rule {
        label: "Linux (Web server)",
        matcher: Matcher::AllPorts(&[22, 80]),
    },
    Rule {
        label: "Linux (Web server)",
        matcher: Matcher::AllPorts(&[22, 443]),
    },
    Rule {
        label: "Linux/Unix",
        matcher: Matcher::AllPorts(&[22]),
    },
    Rule {
        label: "macOS",
        matcher: Matcher::AnyPort(&[548, 631]),
    },
    Rule {
        label: "Network Device/Router",
        matcher: Matcher::Gateway {
            any: &[23, 80, 443],
            max_open: 5,
        },
    },
];

/// Classify a host from its evidence. Pure: identical input, identical
/// output, no hidden state.
pub fn classify(ev: &Evidence<'_>) -> Classification {
    let device = RULES
        .iter()
        .find(|rule| rule.matches(ev))
        .map(|rule| rule.label.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let mut services = BTreeMap::new();
    for &port in ev.open_ports {
        let banner_label = ev.banners.get(&port).and_then(|b| service_from_banner(b));
        let label = banner_label.or_else(|| service_name(port));
        if let Some(label) = label {
            services.insert(port, label.to_string());
        }
    }

    Classification { device, services }
}

/// A banner that unambiguously identifies its protocol overrides the
/// well-known-port table.
fn service_from_banner(banner: &str) -> Option<&'static str> {
    if banner.contains("SSH") {
        Some("ssh")
    } else if banner.contains("HTTP") {
        Some("http")
    } else if banner.contains("FTP") {
        Some("ftp")
    } else if banner.contains("SMTP") || banner.contains("ESMTP") {
        Some("smtp")
    } else if banner.contains("POP3") {
        Some("pop3")
    } else if banner.contains("IMAP") {
        Some("imap")
    } else {
        None
    }
}
