//! Name derivation and address helpers shared by the record builders.

use sha1::{Digest, Sha1};
use std::io;
use std::net::{IpAddr, Ipv4Addr};

use crate::error::GeneratorError;
use crate::resolver::Resolver;

/// Human-oriented base-32 alphabet (z-base-32).
const ZBASE32_ALPHABET: &[u8; 32] = b"ybndrfg8ejkmcpqxot1uwisza345h769";

/// Length of the disambiguator produced by [`short_hash`].
pub const SHORT_HASH_LEN: usize = 5;

/// Short, printable digest of `s`: the first five z-base-32 characters of its
/// SHA-1 hash.
///
/// Five characters carry 25 bits, which is plenty to tell apart task
/// instances that share a name.
pub fn short_hash(s: &str) -> String {
    let digest = Sha1::digest(s.as_bytes());
    let head = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);

    (0..SHORT_HASH_LEN)
        .map(|i| {
            let index = (head >> (27 - 5 * i)) & 0x1f;
            char::from(ZBASE32_ALPHABET[index as usize])
        })
        .collect()
}

/// Lowercased trailing dash-delimited field of an agent identifier.
///
/// `20160107-001256-134875658-5050-27524-S3` becomes `s3`.
pub fn slave_id_tail(slave_id: &str) -> String {
    slave_id
        .rsplit('-')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Parse `host` as an IP literal, unwrapping IPv4-mapped IPv6 forms.
pub fn parse_ip(host: &str) -> Option<IpAddr> {
    host.parse::<IpAddr>().ok().map(|ip| ip.to_canonical())
}

/// Resolve `host` to all of its addresses, in resolver order.
///
/// IP literals are returned as-is without a lookup.
pub fn host_to_ips(resolver: &dyn Resolver, host: &str) -> io::Result<Vec<IpAddr>> {
    if let Some(ip) = parse_ip(host) {
        return Ok(vec![ip]);
    }

    let ips = resolver.lookup_host(host)?;
    Ok(ips.into_iter().map(|ip| ip.to_canonical()).collect())
}

/// Resolve `host` to its first IPv4 address.
///
/// `Ok(None)` means the lookup succeeded without yielding any IPv4 address;
/// callers typically fall back to the original host string.
pub fn host_to_ipv4(resolver: &dyn Resolver, host: &str) -> io::Result<Option<Ipv4Addr>> {
    let found = host_to_ips(resolver, host)?
        .into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        });
    Ok(found)
}

/// Split `host:port` (or `[v6]:port`) into its parts.
pub fn split_host_port(addr: &str) -> Result<(String, u16), GeneratorError> {
    let invalid = || GeneratorError::InvalidAddress(addr.to_string());

    let (host, port) = match addr.strip_prefix('[') {
        Some(rest) => {
            let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
            let port = tail.strip_prefix(':').ok_or_else(invalid)?;
            (host, port)
        }
        None => {
            let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
            if host.contains(':') {
                // unbracketed IPv6
                return Err(invalid());
            }
            (host, port)
        }
    };

    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;
    Ok((host.to_string(), port))
}
