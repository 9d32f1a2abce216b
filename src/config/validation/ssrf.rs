//! Private-target detection
//!
//! Used by batch validation when `block_private_targets` is enabled, so a dispatcher running
//! inside a VPC cannot be pointed at its own network or the cloud metadata server.

use std::net::{IpAddr, Ipv4Addr};
use url::{Host, Url};

/// Reject URLs whose host is loopback, private, link-local or a metadata endpoint
pub fn check_public_target(url: &Url) -> Result<(), String> {
    let host = url
        .host()
        .ok_or_else(|| "URL must have a host".to_string())?;

    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_lowercase();
            let blocked_hosts = [
                "localhost",
                // GCP metadata endpoint
                "metadata.google.internal",
                "metadata",
                // Common internal suffixes
                "internal",
                "local",
            ];

            for blocked in blocked_hosts {
                if domain == blocked || domain.ends_with(&format!(".{}", blocked)) {
                    return Err(format!("host '{}' is an internal address", domain));
                }
            }

            // Decimal-encoded IPv4 hosts survive URL parsing as domains on some inputs
            if !domain.is_empty() && domain.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(num) = domain.parse::<u32>() {
                    if is_private_or_internal_ip(&IpAddr::V4(Ipv4Addr::from(num))) {
                        return Err(format!("host '{}' is a private IP address", domain));
                    }
                }
            }

            Ok(())
        }
        Host::Ipv4(ip) => check_ip(IpAddr::V4(ip)),
        Host::Ipv6(ip) => check_ip(IpAddr::V6(ip)),
    }
}

fn check_ip(ip: IpAddr) -> Result<(), String> {
    if is_private_or_internal_ip(&ip) {
        Err(format!("host '{}' is a private IP address", ip))
    } else {
        Ok(())
    }
}

/// Check if an IP address is private, internal, or reserved
fn is_private_or_internal_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_loopback()
            // RFC 1918
            || ipv4.is_private()
            // 169.254.0.0/16, includes the metadata server
            || ipv4.is_link_local()
            || ipv4.is_broadcast()
            || ipv4.is_unspecified()
            // Shared address space (100.64.0.0/10) - RFC 6598
            || (ipv4.octets()[0] == 100 && (ipv4.octets()[1] & 0xC0) == 64)
            // Reserved (240.0.0.0/4)
            || ipv4.octets()[0] >= 240
        }
        IpAddr::V6(ipv6) => {
            ipv6.is_loopback()
            || ipv6.is_unspecified()
            // Unique local (fc00::/7)
            || ((ipv6.segments()[0] & 0xfe00) == 0xfc00)
            // Link-local (fe80::/10)
            || ((ipv6.segments()[0] & 0xffc0) == 0xfe80)
            || ipv6.to_ipv4_mapped().is_some_and(|ipv4| {
                ipv4.is_loopback() || ipv4.is_private() || ipv4.is_link_local()
            })
        }
    }
}
