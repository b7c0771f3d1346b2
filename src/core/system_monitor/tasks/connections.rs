//! Established network connections, one row per owning process.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::core::sampler::Collector;
use crate::core::system_monitor::ConnectionRow;
use crate::error::Result;

const TCP_ESTABLISHED: u8 = 0x01;

/// One socket line from `/proc/net/tcp{,6}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SocketEntry {
    pub remote: Option<SocketAddr>,
    pub state: u8,
    pub inode: u64,
}

/// Collector for the "live app connections" list.
///
/// Polling frequency: 3 seconds. Only ESTABLISHED TCP connections are
/// reported and each PID appears once per cycle (first connection wins).
#[derive(Debug, Default)]
pub struct ConnectionCollector;

impl ConnectionCollector {
    pub fn new() -> Self {
        Self
    }
}

impl Collector for ConnectionCollector {
    type Snapshot = Vec<ConnectionRow>;

    fn name(&self) -> &str {
        "connections"
    }

    #[cfg(target_os = "linux")]
    fn collect(&mut self) -> Result<Vec<ConnectionRow>> {
        linux::collect()
    }

    #[cfg(not(target_os = "linux"))]
    fn collect(&mut self) -> Result<Vec<ConnectionRow>> {
        Err(crate::error::SysdeckError::unsupported(
            "connection listing is only implemented on Linux",
        ))
    }
}

/// Turn socket entries into rows.
///
/// `pid_of` maps a socket inode to its owner; `describe` yields the process
/// name and executable path. Sockets whose owner cannot be resolved or
/// described (exited, other user's process) are skipped.
pub(crate) fn build_rows<P, D>(entries: &[SocketEntry], pid_of: P, mut describe: D) -> Vec<ConnectionRow>
where
    P: Fn(u64) -> Option<u32>,
    D: FnMut(u32) -> Option<(String, String)>,
{
    let mut seen_pids = HashSet::new();
    let mut rows = Vec::new();

    for entry in entries {
        if entry.state != TCP_ESTABLISHED {
            continue;
        }
        let Some(pid) = pid_of(entry.inode) else {
            continue;
        };
        if seen_pids.contains(&pid) {
            continue;
        }
        let Some((name, exe_path)) = describe(pid) else {
            continue;
        };

        seen_pids.insert(pid);
        rows.push(ConnectionRow {
            pid,
            name,
            exe_path,
            remote_addr: entry
                .remote
                .map(|addr| format!("{}:{}", addr.ip(), addr.port()))
                .unwrap_or_else(|| "Unknown".to_string()),
            status: "ESTABLISHED".to_string(),
        });
    }

    rows
}

/// Parse one data line of `/proc/net/tcp` or `/proc/net/tcp6`.
pub(crate) fn parse_proc_net_line(line: &str, is_ipv6: bool) -> Option<SocketEntry> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 10 {
        return None;
    }

    let remote = parse_address(parts[2], is_ipv6)?;
    let state = u8::from_str_radix(parts[3], 16).ok()?;
    let inode = parts[9].parse::<u64>().ok()?;

    Some(SocketEntry {
        remote: (remote.port() != 0).then_some(remote),
        state,
        inode,
    })
}

/// Addresses are hex words in host byte order followed by a hex port.
fn parse_address(addr: &str, is_ipv6: bool) -> Option<SocketAddr> {
    let (ip_hex, port_hex) = addr.split_once(':')?;
    let port = u16::from_str_radix(port_hex, 16).ok()?;

    let ip = if is_ipv6 {
        if ip_hex.len() != 32 {
            return None;
        }
        let mut octets = [0u8; 16];
        for (i, chunk) in octets.chunks_mut(4).enumerate() {
            let word = u32::from_str_radix(&ip_hex[i * 8..i * 8 + 8], 16).ok()?;
            chunk.copy_from_slice(&word.to_ne_bytes());
        }
        IpAddr::V6(Ipv6Addr::from(octets))
    } else {
        let word = u32::from_str_radix(ip_hex, 16).ok()?;
        IpAddr::V4(Ipv4Addr::from(word.to_ne_bytes()))
    };

    Some(SocketAddr::new(ip, port))
}

#[cfg(target_os = "linux")]
mod linux {
    use std::collections::HashMap;
    use std::fs;
    use std::io::{BufRead, BufReader};

    use super::{build_rows, parse_proc_net_line, SocketEntry};
    use crate::core::system_monitor::ConnectionRow;
    use crate::error::{Result, SysdeckError};

    pub(super) fn collect() -> Result<Vec<ConnectionRow>> {
        let mut entries = read_table("/proc/net/tcp", false)?;
        match read_table("/proc/net/tcp6", true) {
            Ok(v6) => entries.extend(v6),
            Err(e) => log::debug!("Skipping IPv6 sockets: {}", e),
        }

        let owners = socket_owners();
        Ok(build_rows(
            &entries,
            |inode| owners.get(&inode).copied(),
            describe_process,
        ))
    }

    fn read_table(path: &str, is_ipv6: bool) -> Result<Vec<SocketEntry>> {
        let file = fs::File::open(path).map_err(|e| {
            SysdeckError::metric_collection(format!("Failed to open {}: {}", path, e))
        })?;

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines().skip(1) {
            if let Some(entry) = parse_proc_net_line(&line?, is_ipv6) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Map socket inode to PID by scanning `/proc/<pid>/fd`.
    ///
    /// Processes we may not inspect are silently left out.
    fn socket_owners() -> HashMap<u64, u32> {
        let mut owners = HashMap::new();
        let Ok(proc_dir) = fs::read_dir("/proc") else {
            return owners;
        };

        for entry in proc_dir.flatten() {
            let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
                continue;
            };
            let Ok(fds) = fs::read_dir(entry.path().join("fd")) else {
                continue;
            };

            for fd in fds.flatten() {
                let Ok(link) = fs::read_link(fd.path()) else {
                    continue;
                };
                let inode = link
                    .to_str()
                    .and_then(|s| s.strip_prefix("socket:["))
                    .and_then(|s| s.strip_suffix(']'))
                    .and_then(|s| s.parse::<u64>().ok());
                if let Some(inode) = inode {
                    owners.entry(inode).or_insert(pid);
                }
            }
        }

        owners
    }

    fn describe_process(pid: u32) -> Option<(String, String)> {
        let name = fs::read_to_string(format!("/proc/{}/comm", pid)).ok()?;
        let exe = fs::read_link(format!("/proc/{}/exe", pid))
            .map(|path| path.to_string_lossy().to_string())
            .unwrap_or_default();
        Some((name.trim().to_string(), exe))
    }
}
