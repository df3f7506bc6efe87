//! Order draft validation and the multi-step checkout form
//!
//! The draft is the in-memory order being typed into the three-step form. The
//! same struct doubles as the `POST /api/create-payment` request body, so the
//! client-side rules and the server-side re-validation live next to each
//! other.

use crate::error::FieldError;
use crate::orders::shipping::ShippingMethod;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("static regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));
// French mobile/landline, after whitespace strip.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+33|0)[1-9](\d{2}){4}$").expect("static regex"));
static POSTAL_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("static regex"));

/// Maximum order amount accepted by the form, in euros.
pub const MAX_AMOUNT_EUR: i64 = 1000;

/// One in-progress order. Field names follow the wire contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderDraft {
    pub reference: String,
    /// Decimal string, euros.
    pub amount: String,
    pub tiktok_pseudo: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub shipping_method: Option<ShippingMethod>,
}

/// Form steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Order,
    Delivery,
    Confirmation,
}

impl Step {
    fn next(self) -> Option<Step> {
        match self {
            Step::Order => Some(Step::Delivery),
            Step::Delivery => Some(Step::Confirmation),
            Step::Confirmation => None,
        }
    }
}

/// A form field, for input normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Reference,
    Amount,
    TiktokPseudo,
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    PostalCode,
    ShippingMethod,
}

/// Keep digits and `+` only.
pub fn normalize_phone(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Digits only, truncated to 5.
pub fn normalize_postal_code(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(5)
        .collect()
}

pub fn normalize_email(value: &str) -> String {
    value.to_lowercase()
}

/// Insert the leading `@` if the user left it out.
pub fn normalize_tiktok_pseudo(value: &str) -> String {
    if !value.is_empty() && !value.starts_with('@') {
        format!("@{}", value)
    } else {
        value.to_string()
    }
}

/// Parse a decimal euro amount into minor currency units, rounding (never
/// truncating) to avoid float drift: `"19.9"` becomes `1990`.
pub fn amount_to_cents(amount: &str) -> Option<i64> {
    let parsed = Decimal::from_str(amount.trim()).ok()?;
    (parsed * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

impl OrderDraft {
    /// Validate the fields belonging to one step. Returns an error map keyed
    /// by the offending field; the step may only be advanced when it is
    /// empty.
    pub fn validate_step(&self, step: Step) -> BTreeMap<&'static str, String> {
        let mut errors = BTreeMap::new();

        match step {
            Step::Order => {
                if self.reference.trim().is_empty() {
                    errors.insert("reference", "reference is required".to_string());
                } else if !REFERENCE_RE.is_match(&self.reference) {
                    errors.insert(
                        "reference",
                        "reference may only contain letters, digits and dashes".to_string(),
                    );
                }

                if self.amount.trim().is_empty() {
                    errors.insert("amount", "amount is required".to_string());
                } else {
                    match Decimal::from_str(self.amount.trim()) {
                        Ok(amount) if amount <= Decimal::ZERO => {
                            errors.insert("amount", "amount must be greater than 0".to_string());
                        }
                        Ok(amount) if amount > Decimal::from(MAX_AMOUNT_EUR) => {
                            errors.insert(
                                "amount",
                                format!("amount must be at most {} EUR", MAX_AMOUNT_EUR),
                            );
                        }
                        Ok(_) => {}
                        Err(_) => {
                            errors.insert("amount", "amount must be a number".to_string());
                        }
                    }
                }

                if self.tiktok_pseudo.trim().is_empty() {
                    errors.insert("tiktokPseudo", "TikTok pseudo is required".to_string());
                } else if !self.tiktok_pseudo.starts_with('@') {
                    errors.insert("tiktokPseudo", "TikTok pseudo must start with @".to_string());
                }
            }
            Step::Delivery => {
                if self.first_name.trim().is_empty() {
                    errors.insert("firstName", "first name is required".to_string());
                } else if self.first_name.chars().count() < 2 {
                    errors.insert(
                        "firstName",
                        "first name must be at least 2 characters".to_string(),
                    );
                }

                if self.last_name.trim().is_empty() {
                    errors.insert("lastName", "last name is required".to_string());
                } else if self.last_name.chars().count() < 2 {
                    errors.insert(
                        "lastName",
                        "last name must be at least 2 characters".to_string(),
                    );
                }

                if self.email.trim().is_empty() {
                    errors.insert("email", "email is required".to_string());
                } else if !EMAIL_RE.is_match(&self.email) {
                    errors.insert("email", "invalid email format".to_string());
                }

                let phone = self.phone.replace(char::is_whitespace, "");
                if phone.is_empty() {
                    errors.insert("phone", "phone number is required".to_string());
                } else if !PHONE_RE.is_match(&phone) {
                    errors.insert("phone", "invalid French phone number".to_string());
                }

                if self.address.trim().is_empty() {
                    errors.insert("address", "address is required".to_string());
                } else if self.address.chars().count() < 5 {
                    errors.insert(
                        "address",
                        "address must be at least 5 characters".to_string(),
                    );
                }

                if self.city.trim().is_empty() {
                    errors.insert("city", "city is required".to_string());
                } else if self.city.chars().count() < 2 {
                    errors.insert("city", "city must be at least 2 characters".to_string());
                }

                if self.postal_code.trim().is_empty() {
                    errors.insert("postalCode", "postal code is required".to_string());
                } else if !POSTAL_CODE_RE.is_match(&self.postal_code) {
                    errors.insert("postalCode", "postal code must be 5 digits".to_string());
                }
            }
            Step::Confirmation => {
                if self.shipping_method.is_none() {
                    errors.insert(
                        "shippingMethod",
                        "a shipping method must be selected".to_string(),
                    );
                }
            }
        }

        errors
    }

    /// Server-side re-validation before any provider call. Collects every
    /// failing field instead of stopping at the first one.
    pub fn validate_for_gateway(&self) -> Vec<FieldError> {
        let mut details = Vec::new();

        if self.first_name.chars().count() < 2 {
            details.push(FieldError::new(
                "firstName",
                "first name must be at least 2 characters",
            ));
        }
        if self.last_name.chars().count() < 2 {
            details.push(FieldError::new(
                "lastName",
                "last name must be at least 2 characters",
            ));
        }
        if self.tiktok_pseudo.chars().count() < 3 {
            details.push(FieldError::new(
                "tiktokPseudo",
                "TikTok pseudo must be at least 3 characters",
            ));
        }
        if self.address.chars().count() < 5 {
            details.push(FieldError::new(
                "address",
                "address must be at least 5 characters",
            ));
        }
        if self.city.chars().count() < 2 {
            details.push(FieldError::new("city", "city must be at least 2 characters"));
        }
        if !EMAIL_RE.is_match(&self.email) {
            details.push(FieldError::new("email", "invalid email format"));
        }
        match amount_to_cents(&self.amount) {
            Some(cents) if cents > 0 => {}
            _ => details.push(FieldError::new(
                "amount",
                "amount must be a positive number",
            )),
        }
        if self.shipping_method.is_none() {
            details.push(FieldError::new(
                "shippingMethod",
                "shipping method must be chronopost or standard",
            ));
        }

        details
    }

    /// Order total including the shipping fee, in euros.
    pub fn total(&self) -> Option<Decimal> {
        let amount = Decimal::from_str(self.amount.trim()).ok()?;
        Some(amount + self.shipping_method?.price())
    }
}

/// The three-step checkout form state machine.
///
/// Owns the draft, the current step and the per-field error map. Step N+1 is
/// reachable only while the current step's error map is empty.
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    draft: OrderDraft,
    step: Step,
    errors: BTreeMap<&'static str, String>,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutForm {
    pub fn new() -> Self {
        Self {
            draft: OrderDraft {
                shipping_method: Some(ShippingMethod::Chronopost),
                ..OrderDraft::default()
            },
            step: Step::Order,
            errors: BTreeMap::new(),
        }
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn errors(&self) -> &BTreeMap<&'static str, String> {
        &self.errors
    }

    /// Apply one keystroke's worth of input, normalizing as the original form
    /// does, and clear any stale error on that field.
    pub fn input(&mut self, field: FormField, value: &str) {
        let (key, normalized): (&'static str, String) = match field {
            FormField::Reference => ("reference", value.to_string()),
            FormField::Amount => ("amount", value.to_string()),
            FormField::TiktokPseudo => ("tiktokPseudo", normalize_tiktok_pseudo(value)),
            FormField::FirstName => ("firstName", value.to_string()),
            FormField::LastName => ("lastName", value.to_string()),
            FormField::Email => ("email", normalize_email(value)),
            FormField::Phone => ("phone", normalize_phone(value)),
            FormField::Address => ("address", value.to_string()),
            FormField::City => ("city", value.to_string()),
            FormField::PostalCode => ("postalCode", normalize_postal_code(value)),
            FormField::ShippingMethod => ("shippingMethod", value.to_string()),
        };

        match field {
            FormField::Reference => self.draft.reference = normalized,
            FormField::Amount => self.draft.amount = normalized,
            FormField::TiktokPseudo => self.draft.tiktok_pseudo = normalized,
            FormField::FirstName => self.draft.first_name = normalized,
            FormField::LastName => self.draft.last_name = normalized,
            FormField::Email => self.draft.email = normalized,
            FormField::Phone => self.draft.phone = normalized,
            FormField::Address => self.draft.address = normalized,
            FormField::City => self.draft.city = normalized,
            FormField::PostalCode => self.draft.postal_code = normalized,
            FormField::ShippingMethod => {
                self.draft.shipping_method = ShippingMethod::from_str(value).ok()
            }
        }

        self.errors.remove(key);
    }

    /// Validate the current step and advance when clean. Returns whether the
    /// form moved forward.
    pub fn next_step(&mut self) -> bool {
        self.errors = self.draft.validate_step(self.step);
        if !self.errors.is_empty() {
            return false;
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    /// Final submission from the confirmation step. Re-validates everything
    /// and hands back the draft for the payment request.
    pub fn submit(&mut self) -> Result<OrderDraft, BTreeMap<&'static str, String>> {
        let mut errors = BTreeMap::new();
        for step in [Step::Order, Step::Delivery, Step::Confirmation] {
            errors.extend(self.draft.validate_step(step));
        }
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(errors);
        }
        Ok(self.draft.clone())
    }
}
