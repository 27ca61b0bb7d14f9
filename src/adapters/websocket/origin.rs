//! Origin check for live preview WebSocket upgrades.

use std::collections::HashSet;

use http::Uri;

/// Hosts that may always open a preview socket.
const LOCAL_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Allow-list of browser origins, compared by host.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed_hosts: HashSet<String>,
}

impl Default for OriginPolicy {
    fn default() -> Self {
        Self::new("", &[])
    }
}

impl OriginPolicy {
    /// Builds a policy allowing the local hosts, the host of `base_url`
    /// and each entry of `allowed_origins`.
    ///
    /// Entries may be full origins (`https://blog.example.com`) or bare hosts.
    pub fn new(base_url: &str, allowed_origins: &[String]) -> Self {
        let mut allowed_hosts: HashSet<String> =
            LOCAL_HOSTS.iter().map(|h| h.to_string()).collect();

        allowed_hosts.extend(host_of(base_url));
        allowed_hosts.extend(allowed_origins.iter().filter_map(|entry| {
            if entry.contains("://") {
                host_of(entry)
            } else {
                let host = entry.trim().to_ascii_lowercase();
                (!host.is_empty()).then_some(host)
            }
        }));

        Self { allowed_hosts }
    }

    /// True if a request carrying this `Origin` header may upgrade.
    ///
    /// Requests without an `Origin` header are refused.
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        origin
            .and_then(host_of)
            .is_some_and(|host| self.allowed_hosts.contains(&host))
    }
}

fn host_of(origin: &str) -> Option<String> {
    let uri: Uri = origin.trim().parse().ok()?;
    uri.host().map(str::to_ascii_lowercase)
}
