// Static table of trusted database credential sets and the `db` selector lookup.
// Callers choose a profile and a host; credentials never come from the request.

use std::{collections::BTreeMap, fmt, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};

use crate::utils::errors::LookupError;

/// Keys accepted by `db` in multi-profile mode, in lookup order
pub const PROFILE_KEYS: [&str; 3] = ["db1", "db2", "db3"];

const DEFAULT_DB_PORT: u16 = 5432;

/// One trusted credential set. The host is supplied per request.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseProfile {
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
}

impl fmt::Debug for DatabaseProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseProfile")
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileMode {
    /// One default profile, `db` is ignored
    Single,
    /// Up to three named profiles, `db` is required
    Multi,
}

impl FromStr for ProfileMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multi" => Ok(Self::Multi),
            other => Err(anyhow!("Invalid PROFILE_MODE '{other}', expected 'single' or 'multi'")),
        }
    }
}

#[derive(Clone, Debug)]
pub enum ProfileRegistry {
    Single(DatabaseProfile),
    Multi(BTreeMap<String, DatabaseProfile>),
}

impl ProfileRegistry {
    /// Builds the registry from `PROFILE_MODE` plus either `DB_*` or `DB1_*`..`DB3_*`
    pub fn from_lookup(get_var: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let mode: ProfileMode = get_var("PROFILE_MODE")
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or(ProfileMode::Single);

        match mode {
            ProfileMode::Single => {
                let profile: DatabaseProfile = load_profile(get_var, "DB")?
                    .context("Missing DB_USER, required in single profile mode")?;
                Ok(Self::Single(profile))
            }
            ProfileMode::Multi => {
                let mut named: BTreeMap<String, DatabaseProfile> = BTreeMap::new();
                for key in PROFILE_KEYS {
                    if let Some(profile) = load_profile(get_var, &key.to_ascii_uppercase())? {
                        named.insert(key.to_string(), profile);
                    }
                }

                if named.is_empty() {
                    bail!("PROFILE_MODE=multi requires at least one of DB1_USER, DB2_USER, DB3_USER");
                }
                Ok(Self::Multi(named))
            }
        }
    }

    pub fn mode(&self) -> ProfileMode {
        match self {
            Self::Single(_) => ProfileMode::Single,
            Self::Multi(_) => ProfileMode::Multi,
        }
    }

    /// Accepted `db` values (empty in single mode)
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Single(_) => Vec::new(),
            Self::Multi(named) => named.keys().map(String::as_str).collect(),
        }
    }

    /// Picks the profile for a request. Runs before any I/O.
    pub fn resolve(&self, selector: Option<&str>) -> Result<&DatabaseProfile, LookupError> {
        match self {
            Self::Single(profile) => Ok(profile),
            Self::Multi(named) => {
                let key: &str = selector.filter(|s| !s.is_empty()).ok_or_else(|| {
                    LookupError::validation(format!(
                        "Query parameter 'db' is required; expected one of: {}",
                        self.keys().join(", ")
                    ))
                })?;

                named.get(key).ok_or_else(|| {
                    LookupError::validation(format!(
                        "Unknown database profile '{}'; expected one of: {}",
                        key,
                        self.keys().join(", ")
                    ))
                })
            }
        }
    }
}

/// Reads `{prefix}_USER`, `_PASSWORD`, `_NAME`, `_PORT`. Absent user means no profile.
fn load_profile(
    get_var: &dyn Fn(&str) -> Option<String>,
    prefix: &str,
) -> Result<Option<DatabaseProfile>> {
    let Some(user) = get_var(&format!("{prefix}_USER")) else {
        return Ok(None);
    };

    let password: String = get_var(&format!("{prefix}_PASSWORD"))
        .with_context(|| format!("Missing {prefix}_PASSWORD for profile {prefix}"))?;
    let database: String = get_var(&format!("{prefix}_NAME"))
        .with_context(|| format!("Missing {prefix}_NAME for profile {prefix}"))?;
    let port: u16 = get_var(&format!("{prefix}_PORT"))
        .map(|s| s.parse().with_context(|| format!("Invalid {prefix}_PORT value")))
        .transpose()?
        .unwrap_or(DEFAULT_DB_PORT);

    Ok(Some(DatabaseProfile { user, password, database, port }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn registry(pairs: &[(&str, &str)]) -> Result<ProfileRegistry> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ProfileRegistry::from_lookup(&|key: &str| vars.get(key).cloned())
    }

    fn multi() -> ProfileRegistry {
        registry(&[
            ("PROFILE_MODE", "multi"),
            ("DB1_USER", "reader_one"),
            ("DB1_PASSWORD", "pw-one"),
            ("DB1_NAME", "store_one"),
            ("DB3_USER", "reader_three"),
            ("DB3_PASSWORD", "pw-three"),
            ("DB3_NAME", "store_three"),
            ("DB3_PORT", "6543"),
        ])
        .expect("multi registry should load")
    }

    #[test]
    fn single_mode_is_the_default() {
        let registry = registry(&[
            ("DB_USER", "reader"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "store"),
        ])
        .unwrap();

        assert_eq!(registry.mode(), ProfileMode::Single);
        let profile = registry.resolve(None).unwrap();
        assert_eq!(profile.database, "store");
        assert_eq!(profile.port, 5432);
    }

    #[test]
    fn single_mode_ignores_the_selector() {
        let registry = registry(&[
            ("DB_USER", "reader"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "store"),
        ])
        .unwrap();

        assert_eq!(registry.resolve(Some("db9")).unwrap().user, "reader");
    }

    #[test]
    fn single_mode_requires_credentials() {
        let err = registry(&[("DB_NAME", "store")]).unwrap_err();
        assert!(err.to_string().contains("DB_USER"));

        let err = registry(&[("DB_USER", "reader"), ("DB_NAME", "store")]).unwrap_err();
        assert!(err.to_string().contains("DB_PASSWORD"));
    }

    #[test]
    fn multi_mode_loads_only_configured_profiles() {
        let registry = multi();
        assert_eq!(registry.keys(), vec!["db1", "db3"]);
        assert_eq!(registry.resolve(Some("db3")).unwrap().port, 6543);
    }

    #[test]
    fn multi_mode_rejects_missing_selector() {
        let err = multi().resolve(None).unwrap_err();
        assert!(matches!(err, LookupError::Validation(_)));
        assert!(err.to_string().contains("'db' is required"));
    }

    #[test]
    fn multi_mode_rejects_unknown_selector() {
        let err = multi().resolve(Some("db2")).unwrap_err();
        assert!(matches!(err, LookupError::Validation(_)));
        assert!(err.to_string().contains("db1, db3"));
    }

    #[test]
    fn multi_mode_needs_at_least_one_profile() {
        assert!(registry(&[("PROFILE_MODE", "multi")]).is_err());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(registry(&[("PROFILE_MODE", "pooled")]).is_err());
    }

    #[test]
    fn debug_output_redacts_password() {
        let rendered = format!("{:?}", multi());
        assert!(!rendered.contains("pw-three"));
        assert!(rendered.contains("***"));
    }
}
