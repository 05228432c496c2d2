// directory.rs
// Resolution of user identities to directory security identifiers

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;

use crate::error::{Error, Result};

const SID_ATTRIBUTE: &str = "objectSid";

static SID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^S-\d{1,3}-\d{1,15}(-\d{1,10})*$").expect("SID pattern is valid")
});

/// A single entry returned from a directory search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attributes: HashMap<String, Vec<Vec<u8>>>,
}

impl DirectoryEntry {
    pub fn new(dn: &str) -> Self {
        DirectoryEntry {
            dn: dn.to_string(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<Vec<u8>>) -> Self {
        self.attributes
            .entry(name.to_string())
            .or_default()
            .push(value.into());
        self
    }

    /// Attribute names compare case-insensitively, as they do in LDAP.
    pub fn attribute(&self, name: &str) -> Option<&[Vec<u8>]> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }
}

/// The directory service the resolver searches.
///
/// `filter` uses the LDAP string representation of search filters.
pub trait DirectoryLookup {
    fn search(
        &self,
        base: &str,
        filter: &str,
    ) -> std::result::Result<Vec<DirectoryEntry>, Box<dyn std::error::Error + Send + Sync>>;
}

impl<D: DirectoryLookup + ?Sized> DirectoryLookup for &D {
    fn search(
        &self,
        base: &str,
        filter: &str,
    ) -> std::result::Result<Vec<DirectoryEntry>, Box<dyn std::error::Error + Send + Sync>> {
        (**self).search(base, filter)
    }
}

/// A human-facing user identifier, e.g. a login name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserIdentity(String);

impl UserIdentity {
    pub fn new(identity: &str) -> Result<Self> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(Error::InvalidInput("user identity must not be empty".to_string()));
        }
        Ok(UserIdentity(identity.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A security identifier in its canonical `S-1-5-21-...` form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DirectorySid(String);

impl DirectorySid {
    /// Decodes the binary `objectSid` representation.
    ///
    /// Layout: revision (1 byte), sub-authority count (1 byte), identifier
    /// authority (6 bytes, big-endian), then `count` little-endian 32-bit
    /// sub-authorities.
    pub fn from_binary(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 {
            return Err(Error::InvalidSid(format!(
                "binary SID too short: {} bytes",
                bytes.len()
            )));
        }

        let revision = bytes[0];
        let count = bytes[1] as usize;
        let expected_len = 8 + 4 * count;
        if bytes.len() != expected_len {
            return Err(Error::InvalidSid(format!(
                "binary SID with {} sub-authorities must be {} bytes, got {}",
                count,
                expected_len,
                bytes.len()
            )));
        }

        let authority = bytes[2..8]
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));

        let mut sid = format!("S-{}-{}", revision, authority);
        for chunk in bytes[8..].chunks_exact(4) {
            let sub_authority = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            sid.push('-');
            sid.push_str(&sub_authority.to_string());
        }

        Ok(DirectorySid(sid))
    }

    /// Accepts a SID already in string form.
    pub fn parse(sid: &str) -> Result<Self> {
        let sid = sid.trim();
        if !SID_PATTERN.is_match(sid) {
            return Err(Error::InvalidSid(sid.to_string()));
        }
        Ok(DirectorySid(sid.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DirectorySid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escapes a value for interpolation into an LDAP search filter (RFC 4515).
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Looks up person entries by canonical name and decodes their `objectSid`.
pub struct SidResolver<D> {
    directory: D,
    base: String,
}

impl<D: DirectoryLookup> SidResolver<D> {
    pub fn new(directory: D) -> Self {
        SidResolver {
            directory,
            base: String::new(),
        }
    }

    pub fn with_base(mut self, base: &str) -> Self {
        self.base = base.to_string();
        self
    }

    pub fn resolve(&self, identity: &UserIdentity) -> Result<DirectorySid> {
        let filter = format!(
            "(&(objectClass=person)(cn={}))",
            escape_filter_value(identity.as_str())
        );
        debug!("Searching directory base '{}' with filter {}", self.base, filter);

        let entries = self
            .directory
            .search(&self.base, &filter)
            .map_err(Error::Directory)?;

        let entry = match entries.as_slice() {
            [] => {
                return Err(Error::IdentityNotFound {
                    identity: identity.to_string(),
                })
            }
            [entry] => entry,
            _ => {
                return Err(Error::IdentityAmbiguous {
                    identity: identity.to_string(),
                    matches: entries.len(),
                })
            }
        };

        let raw = entry
            .attribute(SID_ATTRIBUTE)
            .and_then(|values| values.first())
            .ok_or(Error::MissingSidAttribute)?;

        let sid = DirectorySid::from_binary(raw)?;
        info!("Resolved '{}' ({}) to {}", identity, entry.dn, sid);
        Ok(sid)
    }
}
