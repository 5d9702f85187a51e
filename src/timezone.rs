//! IANA timezone name to POSIX TZ rule lookup.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::{debug, error};

use crate::error::AppError;

/// Rule returned whenever a zone cannot be resolved.
pub const UTC_RULE: &str = "UTC0";

// Generated from the footer line of each zone in the IANA database
const EMBEDDED_TABLE: &str = include_str!("../data/tz_posix.json");

/// Where the name to rule table comes from.
#[derive(Debug, Clone, Default)]
pub enum TableSource {
    #[default]
    Embedded,
    File(PathBuf),
}

/// Resolves IANA names such as `Europe/Kyiv` into POSIX rules such as
/// `EET-2EEST,M3.5.0/3,M10.5.0/4`.
///
/// The table is parsed lazily on first use and kept for the lifetime of the
/// resolver. Lookups never fail: anything unknown resolves to [`UTC_RULE`].
#[derive(Debug, Default)]
pub struct TzResolver {
    source: TableSource,
    table: OnceLock<HashMap<String, String>>,
}

impl TzResolver {
    pub fn new(source: TableSource) -> Self {
        Self {
            source,
            table: OnceLock::new(),
        }
    }

    pub fn to_posix(&self, name: &str) -> String {
        if name.is_empty() {
            return UTC_RULE.to_string();
        }

        match self.table().get(name) {
            Some(rule) => rule.clone(),
            None => {
                debug!("tz: no zone data for {}", name);
                UTC_RULE.to_string()
            }
        }
    }

    fn table(&self) -> &HashMap<String, String> {
        self.table.get_or_init(|| match load_table(&self.source) {
            Ok(table) => {
                debug!("tz: loaded {} zones", table.len());
                table
            }
            Err(e) => {
                error!("tz: failed to load zone data: {}", e);
                HashMap::new()
            }
        })
    }
}

fn load_table(source: &TableSource) -> Result<HashMap<String, String>, AppError> {
    let raw = match source {
        TableSource::Embedded => EMBEDDED_TABLE.to_string(),
        TableSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
            AppError::InvalidConfig {
                name: "TZ_DATA_PATH",
                value: format!("{}: {e}", path.display()),
            }
        })?,
    };

    serde_json::from_str(&raw).map_err(|e| AppError::InvalidConfig {
        name: "TZ_DATA_PATH",
        value: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_known_zone() {
        let tz = TzResolver::default();
        assert_eq!(tz.to_posix("Europe/Kyiv"), "EET-2EEST,M3.5.0/3,M10.5.0/4");
        assert_eq!(tz.to_posix("America/Los_Angeles"), "PST8PDT,M3.2.0,M11.1.0");
    }

    #[test]
    fn test_empty_name_is_utc() {
        assert_eq!(TzResolver::default().to_posix(""), UTC_RULE);
    }

    #[test]
    fn test_unknown_name_is_utc() {
        let tz = TzResolver::default();
        assert_eq!(tz.to_posix("Mars/Olympus_Mons"), UTC_RULE);
        assert_eq!(tz.to_posix("europe/kyiv"), UTC_RULE);
    }

    #[test]
    fn test_repeated_lookup_is_stable() {
        let tz = TzResolver::default();
        let first = tz.to_posix("Asia/Kolkata");
        assert_eq!(first, "IST-5:30");
        assert_eq!(tz.to_posix("Asia/Kolkata"), first);
    }

    #[test]
    fn test_missing_file_falls_back_to_utc() {
        let tz = TzResolver::new(TableSource::File("/nonexistent/tz.json".into()));
        assert_eq!(tz.to_posix("Europe/Kyiv"), UTC_RULE);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_utc() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let tz = TzResolver::new(TableSource::File(file.path().to_path_buf()));
        assert_eq!(tz.to_posix("Europe/Kyiv"), UTC_RULE);
    }

    #[test]
    fn test_custom_file_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Test/Zone": "TST-1"}}"#).unwrap();

        let tz = TzResolver::new(TableSource::File(file.path().to_path_buf()));
        assert_eq!(tz.to_posix("Test/Zone"), "TST-1");
        assert_eq!(tz.to_posix("Europe/Kyiv"), UTC_RULE);
    }
}
