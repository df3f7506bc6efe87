use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Shipping options offered at checkout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    Chronopost,
    Standard,
}

impl ShippingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingMethod::Chronopost => "chronopost",
            ShippingMethod::Standard => "standard",
        }
    }

    /// Human-readable label shown on the payment page, emails and labels.
    pub fn label(&self) -> &'static str {
        match self {
            ShippingMethod::Chronopost => "Chronopost Express",
            ShippingMethod::Standard => "Livraison Standard",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ShippingMethod::Chronopost => "Livraison en 24h",
            ShippingMethod::Standard => "2-3 jours ouvrés",
        }
    }

    /// Shipping fee in euros.
    pub fn price(&self) -> Decimal {
        match self {
            ShippingMethod::Chronopost => Decimal::new(990, 2),
            ShippingMethod::Standard => Decimal::new(490, 2),
        }
    }

    /// Shipping fee in minor currency units.
    pub fn price_cents(&self) -> i64 {
        match self {
            ShippingMethod::Chronopost => 990,
            ShippingMethod::Standard => 490,
        }
    }

    /// Label for a raw metadata value. Anything that is not the express
    /// option is treated as standard delivery.
    pub fn label_for(raw: &str) -> &'static str {
        match ShippingMethod::from_str(raw) {
            Ok(method) => method.label(),
            Err(_) => ShippingMethod::Standard.label(),
        }
    }
}

impl std::fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ShippingMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "chronopost" => Ok(ShippingMethod::Chronopost),
            "standard" => Ok(ShippingMethod::Standard),
            other => Err(format!("unsupported shipping method: {}", other)),
        }
    }
}
