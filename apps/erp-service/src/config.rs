//! # Service Configuration
//!
//! Loaded once at startup from `QUIRE_*` environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `QUIRE_DATABASE_PATH` | `./quire.db` (`:memory:` for a scratch database) |
//! | `QUIRE_DB_MAX_CONNECTIONS` | `5` |
//! | `QUIRE_LOG` | `info` |
//! | `QUIRE_GST_CASH_BPS` | `500` |
//! | `QUIRE_GST_CREDIT_BPS` | `500` |
//! | `QUIRE_GST_EXPORT_BPS` | `0` |
//! | `QUIRE_INVOICE_PREFIX` | `INV` |
//! | `QUIRE_UNSET_CREDIT_LIMIT` | `approval` (or `reject`) |
//! | `QUIRE_DISCOUNT_CAP_<ROLE>_BPS` | see `DiscountPolicy::default` |
//!
//! Configuration is read-only after startup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use quire_core::invoice::DEFAULT_INVOICE_PREFIX;
use quire_core::validation::validate_tax_rate_bps;
use quire_core::{CreditPolicy, DiscountPolicy, Role, TaxRate, TaxTable, UnsetLimitPolicy};
use quire_db::DbConfig;

#[derive(Debug, Clone)]
pub struct ErpConfig {
    /// SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    pub max_connections: u32,

    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub log_filter: String,

    /// GST rate per invoice type.
    pub tax_table: TaxTable,

    /// Prefix of every invoice number (`INV-000001`).
    pub invoice_prefix: String,

    pub credit_policy: CreditPolicy,

    pub discount_policy: DiscountPolicy,
}

impl Default for ErpConfig {
    fn default() -> Self {
        ErpConfig {
            database_path: PathBuf::from("./quire.db"),
            max_connections: 5,
            log_filter: "info".to_string(),
            tax_table: TaxTable::default(),
            invoice_prefix: DEFAULT_INVOICE_PREFIX.to_string(),
            credit_policy: CreditPolicy::default(),
            discount_policy: DiscountPolicy::default(),
        }
    }
}

impl ErpConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value of a
    /// variable or `None` when unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ErpConfig::default();

        let tax_table = TaxTable {
            cash: tax_rate(&lookup, "QUIRE_GST_CASH_BPS", defaults.tax_table.cash)?,
            credit: tax_rate(&lookup, "QUIRE_GST_CREDIT_BPS", defaults.tax_table.credit)?,
            export: tax_rate(&lookup, "QUIRE_GST_EXPORT_BPS", defaults.tax_table.export)?,
        };

        let unset_limit: UnsetLimitPolicy = parsed(
            &lookup,
            "QUIRE_UNSET_CREDIT_LIMIT",
            defaults.credit_policy.unset_limit,
        )?;

        let caps = defaults.discount_policy;
        let discount_policy = DiscountPolicy {
            admin_cap_bps: discount_cap(&lookup, Role::Admin, caps.admin_cap_bps)?,
            ho_cap_bps: discount_cap(&lookup, Role::Ho, caps.ho_cap_bps)?,
            branch_cap_bps: discount_cap(&lookup, Role::Branch, caps.branch_cap_bps)?,
            sales_cap_bps: discount_cap(&lookup, Role::Sales, caps.sales_cap_bps)?,
            customer_cap_bps: discount_cap(&lookup, Role::Customer, caps.customer_cap_bps)?,
        };

        let invoice_prefix = lookup("QUIRE_INVOICE_PREFIX")
            .map(|p| p.trim().to_string())
            .unwrap_or(defaults.invoice_prefix);
        if invoice_prefix.is_empty() {
            return Err(ConfigError::InvalidValue("QUIRE_INVOICE_PREFIX".to_string()));
        }

        let max_connections: u32 =
            parsed(&lookup, "QUIRE_DB_MAX_CONNECTIONS", defaults.max_connections)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("QUIRE_DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(ErpConfig {
            database_path: lookup("QUIRE_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            max_connections,
            log_filter: lookup("QUIRE_LOG").unwrap_or(defaults.log_filter),
            tax_table,
            invoice_prefix,
            credit_policy: CreditPolicy::new(unset_limit),
            discount_policy,
        })
    }

    /// Configuration for a throwaway in-memory database.
    pub fn in_memory() -> Self {
        ErpConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            ..ErpConfig::default()
        }
    }

    /// Storage configuration derived from these settings.
    pub fn db_config(&self) -> DbConfig {
        if self.database_path.as_os_str() == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database_path).max_connections(self.max_connections)
        }
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

fn tax_rate(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: TaxRate,
) -> Result<TaxRate, ConfigError> {
    let bps: u32 = parsed(lookup, key, default.bps())?;
    validate_tax_rate_bps(bps).map_err(|_| ConfigError::InvalidValue(key.to_string()))?;
    Ok(TaxRate::from_bps(bps))
}

fn discount_cap(
    lookup: &impl Fn(&str) -> Option<String>,
    role: Role,
    default: i64,
) -> Result<i64, ConfigError> {
    let key = format!("QUIRE_DISCOUNT_CAP_{}_BPS", role.as_str());
    let bps: i64 = parsed(lookup, &key, default)?;
    if !(0..=quire_core::FULL_PERCENT_BPS).contains(&bps) {
        return Err(ConfigError::InvalidValue(key));
    }
    Ok(bps)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = ErpConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.database_path, PathBuf::from("./quire.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.invoice_prefix, "INV");
        assert_eq!(config.tax_table, TaxTable::default());
        assert_eq!(config.credit_policy.unset_limit, UnsetLimitPolicy::RequireApproval);
        assert_eq!(config.discount_policy, DiscountPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let config = ErpConfig::from_lookup(lookup_from(&[
            ("QUIRE_DATABASE_PATH", "/var/lib/quire/erp.db"),
            ("QUIRE_DB_MAX_CONNECTIONS", "12"),
            ("QUIRE_GST_CASH_BPS", "1200"),
            ("QUIRE_GST_EXPORT_BPS", " 0 "),
            ("QUIRE_INVOICE_PREFIX", "BLR"),
            ("QUIRE_UNSET_CREDIT_LIMIT", "reject"),
            ("QUIRE_DISCOUNT_CAP_SALES_BPS", "1500"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/quire/erp.db"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.tax_table.cash.bps(), 1200);
        assert_eq!(config.tax_table.credit.bps(), 500);
        assert!(config.tax_table.export.is_zero());
        assert_eq!(config.invoice_prefix, "BLR");
        assert_eq!(config.credit_policy.unset_limit, UnsetLimitPolicy::Reject);
        assert_eq!(config.discount_policy.sales_cap_bps, 1500);
        assert_eq!(config.discount_policy.branch_cap_bps, 2500);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let cases = [
            ("QUIRE_GST_CREDIT_BPS", "five"),
            ("QUIRE_GST_CASH_BPS", "10001"),
            ("QUIRE_DB_MAX_CONNECTIONS", "0"),
            ("QUIRE_UNSET_CREDIT_LIMIT", "sometimes"),
            ("QUIRE_DISCOUNT_CAP_HO_BPS", "-1"),
            ("QUIRE_INVOICE_PREFIX", "  "),
        ];

        for (key, value) in cases {
            let err = ErpConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
            let ConfigError::InvalidValue(name) = err;
            assert_eq!(name, key);
        }
    }

    #[test]
    fn test_in_memory_uses_single_connection_pool() {
        let db = ErpConfig::in_memory().db_config();
        assert_eq!(db.max_connections, 1);
    }
}
