//! Name parsing and normalization.
//!
//! Names are `label.tld`; record names may prefix any number of record
//! labels, `sub.label.tld`. The top-level domain `h` is an alias for `ℏ`, so
//! `example.h` and `example.ℏ` are the same registry key once normalized.

use crate::{Error, Result};
use core::fmt;

/// Native-ledger top-level domain.
pub const HBAR_TLD: &str = "ℏ";

/// ASCII spelling accepted for [`HBAR_TLD`].
pub const HBAR_TLD_ALIAS: &str = "h";

fn unalias_top_level_domain(tld: &str) -> String {
    if tld == HBAR_TLD_ALIAS {
        HBAR_TLD.to_string()
    } else {
        tld.to_string()
    }
}

/// A second-level name, `example.hh`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ParsedName {
    /// Purchasable label.
    pub second_level_domain: String,
    /// Top-level domain, alias already applied.
    pub top_level_domain: String,
}

/// A record name, `sub.example.hh` or `example.hh`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ParsedRecordName {
    /// Leading labels joined by `.`; empty for the domain's own record.
    pub record_name: String,
    /// Purchasable label.
    pub second_level_domain: String,
    /// Top-level domain, alias already applied.
    pub top_level_domain: String,
}

impl ParsedRecordName {
    /// The registered name this record belongs to.
    pub fn parsed_name(&self) -> ParsedName {
        ParsedName {
            second_level_domain: self.second_level_domain.clone(),
            top_level_domain: self.top_level_domain.clone(),
        }
    }
}

impl fmt::Display for ParsedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.second_level_domain, self.top_level_domain)
    }
}

impl fmt::Display for ParsedRecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.record_name.is_empty() {
            write!(f, "{}.", self.record_name)?;
        }
        write!(f, "{}.{}", self.second_level_domain, self.top_level_domain)
    }
}

/// Parse `example.hh`.
///
/// # Errors
///
/// [`Error::InvalidNameFormat`] unless the name has exactly two non-empty
/// labels.
pub fn parse_name(name: &str) -> Result<ParsedName> {
    let parts: Vec<&str> = name.trim().split('.').collect();

    match parts.as_slice() {
        [sld, tld] if !sld.is_empty() && !tld.is_empty() => Ok(ParsedName {
            second_level_domain: (*sld).to_string(),
            top_level_domain: unalias_top_level_domain(tld),
        }),
        _ => Err(Error::InvalidNameFormat(name.to_string())),
    }
}

/// Parse `sub.example.hh` or `example.hh`.
///
/// # Errors
///
/// [`Error::InvalidRecordNameFormat`] for fewer than two labels or any empty
/// label.
pub fn parse_record_name(name: &str) -> Result<ParsedRecordName> {
    let parts: Vec<&str> = name.trim().split('.').collect();

    if parts.len() < 2 || parts.iter().any(|part| part.is_empty()) {
        return Err(Error::InvalidRecordNameFormat(name.to_string()));
    }

    let (records, domain) = parts.split_at(parts.len() - 2);

    Ok(ParsedRecordName {
        record_name: records.join("."),
        second_level_domain: domain[0].to_string(),
        top_level_domain: unalias_top_level_domain(domain[1]),
    })
}

/// Canonical form of `name`, used as cache key and resolver path segment.
pub fn normalize_name(name: &str) -> Result<String> {
    Ok(parse_name(name)?.to_string())
}

/// Canonical form of a record name.
pub fn normalize_record_name(name: &str) -> Result<String> {
    Ok(parse_record_name(name)?.to_string())
}
