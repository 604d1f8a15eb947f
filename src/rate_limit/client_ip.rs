use http::HeaderMap;

/// Key shared by every request whose origin cannot be trusted.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Which entry of `X-Forwarded-For` identifies the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForwardedFor {
    /// Appended by the nearest proxy. Use behind a single reverse proxy.
    #[default]
    Last,
    /// Left-most entry. Use when a CDN rewrites the chain.
    First,
}

impl ForwardedFor {
    /// `first` or `last`, any case. Anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "last" => Some(Self::Last),
            "first" => Some(Self::First),
            _ => None,
        }
    }
}

/// Derives the rate-limit key for a request from proxy headers.
///
/// Forwarded headers are only read when the deployment trusts its proxy.
/// Otherwise every request shares the [`UNKNOWN_CLIENT`] bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpResolver {
    trust_proxy: bool,
    policy: ForwardedFor,
}

impl ClientIpResolver {
    #[must_use]
    pub fn new(trust_proxy: bool) -> Self {
        Self {
            trust_proxy,
            policy: ForwardedFor::default(),
        }
    }

    #[must_use]
    pub fn policy(mut self, policy: ForwardedFor) -> Self {
        self.policy = policy;
        self
    }

    pub fn trusts_proxy(&self) -> bool {
        self.trust_proxy
    }

    pub fn forwarded_for(&self) -> ForwardedFor {
        self.policy
    }

    pub fn resolve(&self, headers: &HeaderMap) -> String {
        if !self.trust_proxy {
            return UNKNOWN_CLIENT.to_owned();
        }

        if let Some(xff) = header_str(headers, "x-forwarded-for") {
            let mut entries = xff.split(',').map(str::trim);
            let picked = match self.policy {
                ForwardedFor::Last => entries.next_back(),
                ForwardedFor::First => entries.next(),
            };
            return non_blank(picked);
        }

        if let Some(real_ip) = header_str(headers, "x-real-ip") {
            return non_blank(Some(real_ip.trim()));
        }

        UNKNOWN_CLIENT.to_owned()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn non_blank(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_owned()
}
