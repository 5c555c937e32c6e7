//! MSRP URIs.
//!
//! An MSRP URI selects a peer endpoint and one session on it:
//!
//! ```text
//! msrp://alice.example.com:7777/iau39soe2843z;tcp
//! msrps://bob.example.com/9di4eae923wzd;tcp;foo=bar
//! ```
//!
//! Comparison follows RFC 4975, section 6.1: the scheme, host (case
//! insensitive), port, session id, and transport participate; the user part
//! and any URI parameters do not.

use std::{
    any::Any,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use rand::Rng;

use crate::error::UriParseError;

/// The port assumed when a URI does not carry one.
pub const DEFAULT_PORT: u16 = 2855;

/// The transport token of a URI. Only TCP is defined for MSRP.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Transport {
    #[default]
    Tcp,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to the TLS credentials associated with an `msrps` URI.
///
/// The codec never looks inside. The session layer attaches whatever its TLS
/// backend needs and gets it back when connecting. Credentials do not
/// participate in URI comparison or serialization.
#[derive(Clone)]
pub struct TlsCredentials(Arc<dyn Any + Send + Sync>);

impl TlsCredentials {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for TlsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("TlsCredentials(..)")
    }
}

/// An MSRP URI.
#[derive(Clone, Debug)]
pub struct Uri {
    pub use_tls: bool,
    pub user: Option<String>,
    pub host: String,
    /// Explicitly set port. [`Uri::effective_port`] falls back to [`DEFAULT_PORT`].
    pub port: Option<u16>,
    pub session_id: String,
    pub transport: Transport,
    /// URI parameters in serialization order.
    pub parameters: Vec<(String, String)>,
    pub credentials: Option<TlsCredentials>,
}

impl Uri {
    /// A plain (`msrp`) URI for `host` with a freshly generated session id.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            use_tls: false,
            user: None,
            host: host.into(),
            port: None,
            session_id: generate_session_id(),
            transport: Transport::Tcp,
            parameters: Vec::new(),
            credentials: None,
        }
    }

    /// A TLS (`msrps`) URI for `host` with a freshly generated session id.
    pub fn secure(host: impl Into<String>) -> Self {
        Self {
            use_tls: true,
            ..Self::new(host)
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_tls {
            "msrps"
        } else {
            "msrp"
        }
    }

    /// The port to connect to: the explicit one, or [`DEFAULT_PORT`].
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Parses `scheme "://" [user "@"] host [":" port] ["/" session-id] ";" transport [";" params]`.
    ///
    /// A URI without a session id gets a freshly generated one.
    pub fn parse(value: &str) -> Result<Self, UriParseError> {
        let (scheme, rest) = value
            .split_once("://")
            .ok_or(UriParseError::MissingScheme)?;
        let use_tls = match scheme {
            "msrp" => false,
            "msrps" => true,
            other => return Err(UriParseError::InvalidScheme(other.to_string())),
        };

        let (address, rest) = rest
            .split_once(';')
            .ok_or(UriParseError::MissingTransport)?;
        let mut parts = rest.split(';');
        let transport = parts.next().unwrap_or_default();
        if transport != "tcp" {
            return Err(UriParseError::InvalidTransport(transport.to_string()));
        }
        let mut parameters = Vec::new();
        for param in parts {
            let (name, value) = param
                .split_once('=')
                .ok_or(UriParseError::InvalidParameters)?;
            parameters.push((name.to_string(), value.to_string()));
        }

        let (user, address) = match address.split_once('@') {
            Some((user, address)) => (Some(user.to_string()), address),
            None => (None, address),
        };
        let (host_port, session_id) = match address.split_once('/') {
            Some((host_port, session_id)) => (host_port, Some(session_id.to_string())),
            None => (address, None),
        };
        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| UriParseError::InvalidPort(port.to_string()))?;
                (host, Some(port))
            }
            None => (host_port, None),
        };
        if host.is_empty() {
            return Err(UriParseError::EmptyHost);
        }

        Ok(Self {
            use_tls,
            user,
            host: host.to_string(),
            port,
            session_id: session_id.unwrap_or_else(generate_session_id),
            transport: Transport::Tcp,
            parameters,
            credentials: None,
        })
    }
}

/// 80 random bits, hex encoded.
fn generate_session_id() -> String {
    let bits = rand::thread_rng().gen::<u128>() >> 48;
    format!("{bits:x}")
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}://", self.scheme())?;
        if let Some(user) = &self.user {
            write!(f, "{user}@")?;
        }
        f.write_str(&self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        if !self.session_id.is_empty() {
            write!(f, "/{}", self.session_id)?;
        }
        write!(f, ";{}", self.transport)?;
        for (name, value) in &self.parameters {
            write!(f, ";{name}={value}")?;
        }
        Ok(())
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.use_tls == other.use_tls
            && self.host.eq_ignore_ascii_case(&other.host)
            && self.effective_port() == other.effective_port()
            && self.session_id == other.session_id
            && self.transport == other.transport
    }
}

impl Eq for Uri {}

impl Hash for Uri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.use_tls.hash(state);
        self.host.to_ascii_lowercase().hash(state);
        self.effective_port().hash(state);
        self.session_id.hash(state);
        self.transport.hash(state);
    }
}
