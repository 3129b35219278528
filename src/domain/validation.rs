//! Typed request inputs and their field-level validation.
//!
//! Every form keeps its raw values as optional strings so that a malformed
//! number or date is reported next to the other failing fields instead of
//! aborting deserialization of the whole body. `validate` either returns the
//! strongly-typed value or a [`ValidationErrors`] listing every failing field.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::models::{CarAttributes, CarFilter, Transmission};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// ValidationErrors
// ============================================================================

/// Field name -> messages. Ordered so responses are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for a single failing field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        // ---
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        // ---
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        // ---
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ---
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// Field helpers
// ============================================================================

/// Accepts JSON strings, numbers and booleans as text; `null` and absent as `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    // ---
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Trimmed, non-empty value or `None`.
fn present(raw: &Option<String>) -> Option<&str> {
    // ---
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    raw: &Option<String>,
    max_len: usize,
) -> String {
    // ---
    match present(raw) {
        None => {
            errors.add(field, "This field is required.");
            String::new()
        }
        Some(value) if value.chars().count() > max_len => {
            errors.add(
                field,
                format!("Ensure this value has at most {max_len} characters."),
            );
            String::new()
        }
        Some(value) => value.to_string(),
    }
}

fn optional_text(
    errors: &mut ValidationErrors,
    field: &str,
    raw: &Option<String>,
    max_len: usize,
) -> Option<String> {
    // ---
    let value = present(raw)?;
    if value.chars().count() > max_len {
        errors.add(
            field,
            format!("Ensure this value has at most {max_len} characters."),
        );
        return None;
    }
    Some(value.to_string())
}

fn required_parsed<T: std::str::FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    raw: &Option<String>,
    message: &str,
) -> Option<T> {
    // ---
    match present(raw) {
        None => {
            errors.add(field, "This field is required.");
            None
        }
        Some(value) => match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.add(field, message);
                None
            }
        },
    }
}

fn optional_parsed<T: std::str::FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    raw: &Option<String>,
    message: &str,
) -> Option<T> {
    // ---
    let value = present(raw)?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.add(field, message);
            None
        }
    }
}

// ============================================================================
// Car listing form
// ============================================================================

/// Listing form used by both create and update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarForm {
    // ---
    #[serde(default, deserialize_with = "lenient_text")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub daily_rental_price: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub capacity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transmission: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub fuel_tank: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image1: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image2: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image3: Option<String>,
}

impl CarForm {
    // ---
    pub fn validate(&self) -> Result<CarAttributes, ValidationErrors> {
        // ---
        let mut errors = ValidationErrors::new();

        let brand = required_text(&mut errors, "brand", &self.brand, 25);
        let model = required_text(&mut errors, "model", &self.model, 25);
        let city = required_text(&mut errors, "city", &self.city, 30);
        let image1 = required_text(&mut errors, "image1", &self.image1, 255);
        let image2 = optional_text(&mut errors, "image2", &self.image2, 255);
        let image3 = optional_text(&mut errors, "image3", &self.image3, 255);

        let year = required_parsed::<i16>(&mut errors, "year", &self.year, "Enter a whole number.")
            .filter(|y| {
                let ok = *y > 0;
                if !ok {
                    errors.add("year", "Ensure this value is greater than 0.");
                }
                ok
            });

        let capacity = required_parsed::<i16>(
            &mut errors,
            "capacity",
            &self.capacity,
            "Enter a whole number.",
        )
        .filter(|c| {
            let ok = *c > 0;
            if !ok {
                errors.add("capacity", "Ensure this value is greater than 0.");
            }
            ok
        });

        let fuel_tank = required_parsed::<i32>(
            &mut errors,
            "fuel_tank",
            &self.fuel_tank,
            "Enter a whole number.",
        )
        .filter(|f| {
            let ok = *f >= 0;
            if !ok {
                errors.add("fuel_tank", "Ensure this value is greater than or equal to 0.");
            }
            ok
        });

        let transmission = required_parsed::<Transmission>(
            &mut errors,
            "transmission",
            &self.transmission,
            "Select a valid choice: manual, automatic or tiptronic.",
        );

        let daily_rental_price = required_parsed::<Decimal>(
            &mut errors,
            "daily_rental_price",
            &self.daily_rental_price,
            "Enter a number.",
        )
        .and_then(|price| match check_price(price) {
            Ok(price) => Some(price),
            Err(message) => {
                errors.add("daily_rental_price", message);
                None
            }
        });

        errors.finish(|| CarAttributes {
            brand,
            model,
            year: year.unwrap_or_default(),
            daily_rental_price: daily_rental_price.unwrap_or_default(),
            capacity: capacity.unwrap_or_default(),
            transmission: transmission.unwrap_or(Transmission::Manual),
            city,
            fuel_tank: fuel_tank.unwrap_or_default(),
            image1,
            image2,
            image3,
        })
    }
}

/// Positive, at most 5 integer digits and 2 decimal places; returned at scale 2.
fn check_price(price: Decimal) -> Result<Decimal, &'static str> {
    // ---
    let normalized = price.normalize();
    if normalized <= Decimal::ZERO {
        return Err("Ensure this value is greater than 0.");
    }
    if normalized.scale() > 2 {
        return Err("Ensure that there are no more than 2 decimal places.");
    }
    if normalized.trunc() >= Decimal::from(100_000) {
        return Err("Ensure that there are no more than 5 digits before the decimal point.");
    }
    let mut price = normalized;
    price.rescale(2);
    Ok(price)
}

// ============================================================================
// Registration form
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    // ---
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub password: Option<String>,
}

/// Registration data that passed field validation; uniqueness is checked by storage.
#[derive(Debug, Clone)]
pub struct Registration {
    // ---
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

impl RegisterForm {
    // ---
    pub fn validate(&self) -> Result<Registration, ValidationErrors> {
        // ---
        let mut errors = ValidationErrors::new();

        let first_name = required_text(&mut errors, "first_name", &self.first_name, 30);
        let last_name = optional_text(&mut errors, "last_name", &self.last_name, 30);
        let phone_number = required_text(&mut errors, "phone_number", &self.phone_number, 15);

        let email = required_text(&mut errors, "email", &self.email, 254).to_lowercase();
        if !email.is_empty() && !EMAIL_RE.is_match(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        // Passwords are not trimmed.
        let password = match self.password.as_deref() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => {
                errors.add("password", "This field is required.");
                String::new()
            }
        };

        errors.finish(|| Registration {
            first_name,
            last_name,
            email,
            phone_number,
            password,
        })
    }
}

/// Login credentials. Never validated field by field: any mismatch is one
/// indistinguishable failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    // ---
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub password: Option<String>,
}

impl LoginForm {
    // ---
    pub fn phone_number(&self) -> &str {
        self.phone_number.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

// ============================================================================
// Rental form
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RentalForm {
    // ---
    #[serde(default, deserialize_with = "lenient_text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub end_date: Option<String>,
}

/// Parsed booking range. No ordering is enforced between the two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingDates {
    // ---
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl RentalForm {
    // ---
    pub fn validate(&self) -> Result<BookingDates, ValidationErrors> {
        // ---
        let mut errors = ValidationErrors::new();
        let start_date = parse_date(&mut errors, "start_date", &self.start_date);
        let end_date = parse_date(&mut errors, "end_date", &self.end_date);

        match (start_date, end_date) {
            (Some(start_date), Some(end_date)) if errors.is_empty() => Ok(BookingDates {
                start_date,
                end_date,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_date(errors: &mut ValidationErrors, field: &str, raw: &Option<String>) -> Option<NaiveDate> {
    // ---
    match present(raw) {
        None => {
            errors.add(field, "This field is required.");
            None
        }
        Some(value) => match NaiveDate::parse_from_str(value, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add(field, "Enter a valid date (YYYY-MM-DD).");
                None
            }
        },
    }
}

// ============================================================================
// Catalog query
// ============================================================================

/// Query string of the home listing: `?city=&year_from=&year_to=&capacity=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarFilterQuery {
    // ---
    pub city: Option<String>,
    pub year_from: Option<String>,
    pub year_to: Option<String>,
    pub capacity: Option<String>,
}

impl CarFilterQuery {
    // ---
    /// Empty parameters count as absent.
    pub fn into_filter(self) -> Result<CarFilter, ValidationErrors> {
        // ---
        let mut errors = ValidationErrors::new();
        let message = "Enter a whole number.";

        let city = present(&self.city).map(str::to_string);
        let year_from = optional_parsed::<i64>(&mut errors, "year_from", &self.year_from, message);
        let year_to = optional_parsed::<i64>(&mut errors, "year_to", &self.year_to, message);
        let capacity_min = optional_parsed::<i64>(&mut errors, "capacity", &self.capacity, message);

        errors.finish(|| CarFilter {
            city,
            year_from,
            year_to,
            capacity_min,
        })
    }
}
