//! Collision-resistant archive path prefixes for one pipeline assembly.
//!
//! A prefix is `<YYYY-MM-DD_HH-MM-SS>-<suffix>`. The suffix only has to keep
//! two runs that start within the same formatted second apart; it is not a
//! secret.
//!
//! Time and randomness are injected through [`Clock`] and [`SuffixSource`] so
//! tests can pin both.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigurationError, Result};

/// Upper bound on the random suffix length.
pub const MAX_SUFFIX_LEN: usize = 64;

/// Suffix length used when the caller does not pick one.
pub const DEFAULT_SUFFIX_LEN: usize = 8;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Strip every leading `/` from `raw`. Interior and trailing separators are kept.
pub fn normalize(raw: &str) -> &str {
    raw.trim_start_matches('/')
}

/// Format `at` as `YYYY-MM-DD_HH-MM-SS`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Source of opaque run disambiguators.
pub trait SuffixSource: Send + Sync {
    /// Return a suffix of exactly `len` characters.
    fn suffix(&self, len: usize) -> String;
}

/// Lowercase hex drawn from random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSuffix;

impl SuffixSource for UuidSuffix {
    fn suffix(&self, len: usize) -> String {
        let mut out = String::with_capacity(len);
        while out.len() < len {
            out.push_str(&Uuid::new_v4().simple().to_string());
        }
        out.truncate(len);
        out
    }
}

/// Always yields (a prefix of) the same value.
#[derive(Debug, Clone)]
pub struct FixedSuffix(pub String);

impl FixedSuffix {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl SuffixSource for FixedSuffix {
    fn suffix(&self, len: usize) -> String {
        self.0.chars().take(len).collect()
    }
}

/// The path prefix shared by every archival action of one assembly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunPathPrefix {
    timestamp: String,
    suffix: String,
}

impl RunPathPrefix {
    /// `YYYY-MM-DD_HH-MM-SS` component.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl fmt::Display for RunPathPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.timestamp, self.suffix)
    }
}

/// Derives [`RunPathPrefix`] values from an injected suffix source.
pub struct RunPathAllocator {
    suffixes: Box<dyn SuffixSource>,
    suffix_len: usize,
}

impl RunPathAllocator {
    pub fn new(suffixes: Box<dyn SuffixSource>, suffix_len: usize) -> Result<Self> {
        if suffix_len == 0 || suffix_len > MAX_SUFFIX_LEN {
            return Err(ConfigurationError::InvalidSuffixLength { length: suffix_len });
        }
        Ok(Self {
            suffixes,
            suffix_len,
        })
    }

    pub fn suffix_len(&self) -> usize {
        self.suffix_len
    }

    /// Allocate the prefix for a run that started at `at`.
    pub fn allocate(&self, at: &DateTime<Utc>) -> RunPathPrefix {
        RunPathPrefix {
            timestamp: format_timestamp(at),
            suffix: self.suffixes.suffix(self.suffix_len),
        }
    }
}

impl Default for RunPathAllocator {
    fn default() -> Self {
        Self {
            suffixes: Box::new(UuidSuffix),
            suffix_len: DEFAULT_SUFFIX_LEN,
        }
    }
}

impl fmt::Debug for RunPathAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunPathAllocator")
            .field("suffix_len", &self.suffix_len)
            .finish_non_exhaustive()
    }
}
