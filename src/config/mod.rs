use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::app::OutputFormat;

/// Saved domains, loaded from YAML, TOML or JSON by file extension.
///
/// ```yaml
/// format: json
/// domains:
///   customers: "[('customer_rank','>','0'),'!',('active','=','False')]"
/// ```
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DomainsConfig {
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub domains: BTreeMap<String, String>,
}

impl DomainsConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Saved domains whose name matches `pattern`, in name order.
    pub fn select<'a>(&'a self, pattern: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.domains
            .iter()
            .filter(move |(name, _)| glob_match(pattern, name))
            .map(|(name, text)| (name.as_str(), text.as_str()))
    }
}

/// `*` matches any run of characters; everything else is literal.
pub fn glob_match(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == value;
    }

    // First and last parts are anchored; an empty one means a leading or
    // trailing `*`.
    let (prefix, suffix) = (parts[0], parts[parts.len() - 1]);
    if value.len() < prefix.len() + suffix.len()
        || !value.starts_with(prefix)
        || !value.ends_with(suffix)
    {
        return false;
    }

    // Middle parts must appear in order strictly between prefix and suffix.
    let mut remaining = &value[prefix.len()..value.len() - suffix.len()];
    for part in parts[1..parts.len() - 1].iter().filter(|p| !p.is_empty()) {
        match remaining.find(part) {
            Some(idx) => {
                remaining = &remaining[idx + part.len()..];
            }
            None => return false,
        }
    }

    true
}
