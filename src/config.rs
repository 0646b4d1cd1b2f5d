use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::application::cart::CartConfig;
use crate::domain::delivery::DeliveryPolicy;
use crate::domain::pricing::{ContractTerm, DiscountTable};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("{key}: {reason}")]
    Rejected { key: &'static str, reason: String },
}

/// Business rules shared by every request.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub discount_table: DiscountTable,
    pub delivery: DeliveryPolicy,
    pub pharmacy_cart: CartConfig,
    pub supply_cart: CartConfig,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            discount_table: DiscountTable::default(),
            delivery: DeliveryPolicy::default(),
            pharmacy_cart: CartConfig::pharmacy(),
            supply_cart: CartConfig::supply(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub supplier_orders_path: PathBuf,
    pub pricing: PricingConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080u16)?;
        let supplier_orders_path = lookup("SUPPLIER_ORDERS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("supplier_orders.json"));

        let discount_table = match lookup("DISCOUNT_TIERS") {
            Some(raw) => parse_discount_tiers(&raw)?,
            None => DiscountTable::default(),
        };

        let defaults = DeliveryPolicy::default();
        let delivery = DeliveryPolicy::new(
            parse_or(&lookup, "DELIVERY_BASE_DAYS", defaults.base_days())?,
            parse_or(
                &lookup,
                "DELIVERY_DAYS_PER_SHORTAGE_UNIT",
                defaults.days_per_shortage_unit(),
            )?,
            parse_or(&lookup, "DELIVERY_MAX_DAYS", defaults.max_days())?,
        )
        .map_err(|e| ConfigError::Rejected {
            key: "DELIVERY_*",
            reason: e.to_string(),
        })?;

        let mut pharmacy_cart = CartConfig::pharmacy();
        pharmacy_cart.max_quantity =
            parse_or(&lookup, "PHARMACY_CART_MAX_QTY", pharmacy_cart.max_quantity)?;
        let mut supply_cart = CartConfig::supply();
        supply_cart.max_quantity = parse_or(&lookup, "SUPPLY_CART_MAX_QTY", supply_cart.max_quantity)?;
        for (key, cart) in [
            ("PHARMACY_CART_MAX_QTY", &pharmacy_cart),
            ("SUPPLY_CART_MAX_QTY", &supply_cart),
        ] {
            if cart.max_quantity < 1 {
                return Err(ConfigError::Invalid {
                    key,
                    value: cart.max_quantity.to_string(),
                });
            }
        }

        Ok(Self {
            database_url,
            host,
            port,
            supplier_orders_path,
            pricing: PricingConfig {
                discount_table,
                delivery,
                pharmacy_cart,
                supply_cart,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

/// Parses `"6:5,12:10,24:15"` into a discount table.
pub fn parse_discount_tiers(raw: &str) -> Result<DiscountTable, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "DISCOUNT_TIERS",
        value: raw.to_string(),
    };
    let mut terms = Vec::new();
    for tier in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (months, percent) = tier.split_once(':').ok_or_else(invalid)?;
        let months: u32 = months.trim().parse().map_err(|_| invalid())?;
        let percent = BigDecimal::from_str(percent.trim()).map_err(|_| invalid())?;
        terms.push(ContractTerm::new(months, percent));
    }
    DiscountTable::new(terms).map_err(|e| ConfigError::Rejected {
        key: "DISCOUNT_TIERS",
        reason: e.to_string(),
    })
}
