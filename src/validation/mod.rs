//! Per-type DNS record validation.
//!
//! Every record type has a [`RecordValidator`] that checks the raw form
//! fields (content, name, priority, ttl) and either accepts them with
//! normalised values or rejects them with an ordered list of messages.
//! Validators are pure: anything that needs the database (CNAME conflicts,
//! duplicate SOA, ...) lives in [`crate::service::records`].

mod address;
mod certs;
mod fields;
mod hostname;
mod keys;
mod loc;
mod naptr;
pub mod registry;
mod soa;
mod srv;
mod svcb;
mod target;
mod text;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use fields::check_ttl;
pub use hostname::{HostnameValidator, normalize_record_name};
pub use registry::{RecordType, ValidatorRegistry};

/// Injected settings that change how records are judged.
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    /// Reject names made of a single label (`localhost`, `com`).
    pub top_level_tld_check: bool,
}

/// Raw record fields as they arrive from a form or API call.
#[derive(Debug, Clone, Copy)]
pub struct RecordInput<'a> {
    pub content: &'a str,
    pub name: &'a str,
    pub prio: &'a str,
    pub ttl: &'a str,
    pub default_ttl: u32,
    /// Apex of the zone the record belongs to, when known.
    pub zone: Option<&'a str>,
}

impl<'a> RecordInput<'a> {
    pub const DEFAULT_TTL: u32 = 86400;

    pub fn new(content: &'a str, name: &'a str) -> Self {
        Self {
            content,
            name,
            prio: "",
            ttl: "",
            default_ttl: Self::DEFAULT_TTL,
            zone: None,
        }
    }

    pub fn prio(mut self, prio: &'a str) -> Self {
        self.prio = prio;
        self
    }

    pub fn ttl(mut self, ttl: &'a str) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn default_ttl(mut self, default_ttl: u32) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    pub fn zone(mut self, zone: &'a str) -> Self {
        self.zone = Some(zone);
        self
    }
}

/// Normalised record values produced by a successful validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordData {
    pub content: String,
    pub name: String,
    pub prio: u16,
    pub ttl: u32,
}

/// Successful outcome of a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub data: RecordData,
    pub warnings: Vec<String>,
}

impl Accepted {
    pub fn new(data: RecordData) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Failed outcome: one or more human-readable messages, first one primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected(Vec<String>);

impl Rejected {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(vec![msg.into()])
    }

    /// Build from several messages, dropping repeats but keeping order.
    pub fn many(messages: Vec<String>) -> Self {
        let mut out: Vec<String> = Vec::with_capacity(messages.len());
        for m in messages {
            if !out.contains(&m) {
                out.push(m);
            }
        }
        Self(out)
    }

    pub fn first(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }

    pub fn errors(&self) -> &[String] {
        &self.0
    }

    pub fn into_errors(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.first())
    }
}

impl std::error::Error for Rejected {}

impl From<&str> for Rejected {
    fn from(msg: &str) -> Self {
        Self::new(msg)
    }
}

impl From<String> for Rejected {
    fn from(msg: String) -> Self {
        Self::new(msg)
    }
}

/// Outcome of a validation call, as handed to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RecordData>,
}

impl ValidationResult {
    pub fn failure(msg: impl Into<String>) -> Self {
        Rejected::new(msg).into()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Primary error, if the result is a failure.
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

impl From<Rejected> for ValidationResult {
    fn from(rejected: Rejected) -> Self {
        Self {
            valid: false,
            errors: rejected.into_errors(),
            warnings: Vec::new(),
            data: None,
        }
    }
}

impl From<Accepted> for ValidationResult {
    fn from(accepted: Accepted) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: accepted.warnings,
            data: Some(accepted.data),
        }
    }
}

impl From<Result<Accepted, Rejected>> for ValidationResult {
    fn from(res: Result<Accepted, Rejected>) -> Self {
        match res {
            Ok(accepted) => accepted.into(),
            Err(rejected) => rejected.into(),
        }
    }
}

/// Rule set for one record type.
pub trait RecordValidator: Send + Sync {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected>;

    fn validate(&self, input: &RecordInput<'_>) -> ValidationResult {
        self.check(input).into()
    }
}
