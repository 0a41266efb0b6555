//! Process-wide configuration, read once from `ACLKEEPER__*` environment variables.
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

pub static CONFIG: LazyLock<DynAppConfig> = LazyLock::new(get_config);

#[derive(Clone, Deserialize, Serialize, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DynAppConfig {
    pub revoke: RevokeConfig,
    pub identifiers: IdentifierConfig,
}

#[derive(Clone, Deserialize, Serialize, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RevokeConfig {
    /// Check every requested privilege before failing and report all denied
    /// privileges in one error. By default the first denial ends the statement.
    pub report_all_denials: bool,
}

#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct IdentifierConfig {
    /// Lower-case schema and object names before they reach the catalog.
    pub lowercase: bool,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self { lowercase: true }
    }
}

fn get_config() -> DynAppConfig {
    let defaults = figment::providers::Serialized::defaults(DynAppConfig::default());

    #[cfg(not(test))]
    let prefixes = &["ACLKEEPER__"];
    #[cfg(test)]
    let prefixes = &["ACLKEEPER_TEST__"];

    let mut config = figment::Figment::from(defaults);
    for prefix in prefixes {
        let env = figment::providers::Env::prefixed(prefix).split("__");
        config = config.merge(env);
    }

    match config.extract::<DynAppConfig>() {
        Ok(c) => c,
        Err(e) => {
            panic!("Failed to extract aclkeeper config: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // `CONFIG` must be initialized before any jailed env var is set.

    #[test]
    fn test_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = get_config();
            assert_eq!(config, DynAppConfig::default());
            assert!(!config.revoke.report_all_denials);
            assert!(config.identifiers.lowercase);
            Ok(())
        });
    }

    #[test]
    fn test_report_all_denials_env_var() {
        figment::Jail::expect_with(|jail| {
            LazyLock::force(&CONFIG);
            jail.set_env("ACLKEEPER_TEST__REVOKE__REPORT_ALL_DENIALS", "true");
            let config = get_config();
            assert!(config.revoke.report_all_denials);
            Ok(())
        });

        figment::Jail::expect_with(|jail| {
            LazyLock::force(&CONFIG);
            jail.set_env("ACLKEEPER_TEST__REVOKE__REPORT_ALL_DENIALS", "false");
            let config = get_config();
            assert!(!config.revoke.report_all_denials);
            Ok(())
        });
    }

    #[test]
    fn test_lowercase_identifiers_env_var() {
        figment::Jail::expect_with(|jail| {
            LazyLock::force(&CONFIG);
            jail.set_env("ACLKEEPER_TEST__IDENTIFIERS__LOWERCASE", "false");
            let config = get_config();
            assert!(!config.identifiers.lowercase);
            assert!(!config.revoke.report_all_denials);
            Ok(())
        });
    }
}
