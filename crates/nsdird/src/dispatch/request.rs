//! Key fields carried by lookup requests.

use std::fmt;
use std::net::IpAddr;

use nsdir_proto::{Database, FieldReader, FrameError, KeyKind, RequestCode};

/// Decoded lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Entry name.
    Name(String),
    /// Numeric identifier: uid, gid, protocol, or RPC number.
    Number(i32),
    /// Member whose groups are wanted.
    Member(String),
    /// Host or network address.
    Address(IpAddr),
    /// Hardware address.
    Ether([u8; 6]),
    /// Service by name, optionally restricted to one protocol.
    Service {
        name: String,
        protocol: Option<String>,
    },
    /// Service by port, optionally restricted to one protocol.
    Port {
        port: i32,
        protocol: Option<String>,
    },
    /// No key: every entry of the database.
    All,
}

impl LookupKey {
    /// Reads exactly the fields `kind` prescribes.
    ///
    /// An empty protocol string means any protocol.
    pub fn read(kind: KeyKind, reader: &mut FieldReader) -> Result<Self, FrameError> {
        Ok(match kind {
            KeyKind::Name => Self::Name(reader.read_string()?),
            KeyKind::Number => Self::Number(reader.read_i32()?),
            KeyKind::Member => Self::Member(reader.read_string()?),
            KeyKind::Address => Self::Address(reader.read_address()?),
            KeyKind::Ether => Self::Ether(reader.read_ether()?),
            KeyKind::ServiceName => Self::Service {
                name: reader.read_string()?,
                protocol: optional(reader.read_string()?),
            },
            KeyKind::ServiceNumber => Self::Port {
                port: reader.read_i32()?,
                protocol: optional(reader.read_string()?),
            },
            KeyKind::Enumerate => Self::All,
        })
    }

    /// Returns `true` for enumeration requests.
    pub fn is_enumeration(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) | Self::Member(name) => f.write_str(name),
            Self::Number(number) => write!(f, "{number}"),
            Self::Address(address) => write!(f, "{address}"),
            Self::Ether(octets) => {
                let [a, b, c, d, e, g] = octets;
                write!(f, "{a:x}:{b:x}:{c:x}:{d:x}:{e:x}:{g:x}")
            }
            Self::Service { name, protocol } => {
                write!(f, "{name}/{}", protocol.as_deref().unwrap_or("*"))
            }
            Self::Port { port, protocol } => {
                write!(f, "{port}/{}", protocol.as_deref().unwrap_or("*"))
            }
            Self::All => f.write_str("*"),
        }
    }
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// A decoded lookup handed to the directory client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    code: RequestCode,
    key: LookupKey,
}

impl SearchRequest {
    /// Builds a request.
    pub fn new(code: RequestCode, key: LookupKey) -> Self {
        Self { code, key }
    }

    /// Request code the client sent.
    pub fn code(&self) -> RequestCode {
        self.code
    }

    /// Database the lookup runs against.
    pub fn database(&self) -> Database {
        self.code.database()
    }

    /// Decoded key.
    pub fn key(&self) -> &LookupKey {
        &self.key
    }
}
