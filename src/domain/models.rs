use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// A marketplace account. Identity is the phone number, not the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    // ---
    pub id: Uuid,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,

    /// Argon2 PHC string, never sent to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Validated registration data, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    // ---
    pub phone_number: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    // ---
    /// Builds the persisted [`User`] record with a fresh id.
    pub fn into_user(self) -> User {
        // ---
        User {
            id: Uuid::new_v4(),
            phone_number: self.phone_number,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            is_active: true,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            date_joined: Utc::now(),
            last_login: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Manual,
    Automatic,
    Tiptronic,
}

impl Transmission {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            Transmission::Manual => "manual",
            Transmission::Automatic => "automatic",
            Transmission::Tiptronic => "tiptronic",
        }
    }
}

impl FromStr for Transmission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Transmission::Manual),
            "automatic" => Ok(Transmission::Automatic),
            "tiptronic" => Ok(Transmission::Tiptronic),
            other => Err(format!("'{other}' is not one of manual, automatic, tiptronic")),
        }
    }
}

/// Owner-editable listing fields. Produced only by [`crate::domain::CarForm::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarAttributes {
    // ---
    pub brand: String,
    pub model: String,
    pub year: i16,
    pub daily_rental_price: Decimal,
    pub capacity: i16,
    pub transmission: Transmission,
    pub city: String,
    pub fuel_tank: i32,
    pub image1: String,
    pub image2: Option<String>,
    pub image3: Option<String>,
}

/// A car listing. `owner_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    // ---
    pub id: Uuid,
    pub owner_id: Uuid,

    #[serde(flatten)]
    pub attributes: CarAttributes,

    pub listed_at: DateTime<Utc>,
}

impl Car {
    // ---
    pub fn new(owner_id: Uuid, attributes: CarAttributes) -> Self {
        // ---
        Self {
            id: Uuid::new_v4(),
            owner_id,
            attributes,
            listed_at: Utc::now(),
        }
    }

    pub fn daily_rental_price(&self) -> Decimal {
        // ---
        self.attributes.daily_rental_price
    }

    /// True when `filter` would keep this car.
    pub fn matches(&self, filter: &CarFilter) -> bool {
        // ---
        let a = &self.attributes;

        if let Some(city) = &filter.city {
            if !a.city.to_lowercase().eq(&city.to_lowercase()) {
                return false;
            }
        }
        if filter.year_from.is_some_and(|from| i64::from(a.year) < from) {
            return false;
        }
        if filter.year_to.is_some_and(|to| i64::from(a.year) > to) {
            return false;
        }
        if filter.capacity_min.is_some_and(|min| i64::from(a.capacity) < min) {
            return false;
        }
        true
    }
}

/// Catalog filters, all optional and AND-composed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarFilter {
    // ---
    pub city: Option<String>,
    pub year_from: Option<i64>,
    pub year_to: Option<i64>,
    pub capacity_min: Option<i64>,
}

/// A booking. `total_price` is a snapshot taken when the rental was booked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    // ---
    pub id: Uuid,
    pub renter_id: Uuid,
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
    pub booked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn sample_car(city: &str, year: i16, capacity: i16) -> Car {
        // ---
        Car::new(
            Uuid::new_v4(),
            CarAttributes {
                brand: "Toyota".to_string(),
                model: "Corolla".to_string(),
                year,
                daily_rental_price: Decimal::new(5000, 2),
                capacity,
                transmission: Transmission::Automatic,
                city: city.to_string(),
                fuel_tank: 50,
                image1: "car_images/corolla.jpg".to_string(),
                image2: None,
                image3: None,
            },
        )
    }

    #[test]
    fn transmission_parses_case_insensitively() {
        // ---
        assert_eq!("Manual".parse::<Transmission>(), Ok(Transmission::Manual));
        assert_eq!(" tiptronic ".parse::<Transmission>(), Ok(Transmission::Tiptronic));
        assert!("cvt".parse::<Transmission>().is_err());
    }

    #[test]
    fn empty_filter_keeps_everything() {
        // ---
        let car = sample_car("Tbilisi", 2015, 4);
        assert!(car.matches(&CarFilter::default()));
    }

    #[test]
    fn city_match_ignores_case_but_not_substrings() {
        // ---
        let car = sample_car("Tbilisi", 2015, 4);

        let exact = CarFilter {
            city: Some("TBILISI".to_string()),
            ..CarFilter::default()
        };
        let partial = CarFilter {
            city: Some("Tbil".to_string()),
            ..CarFilter::default()
        };

        assert!(car.matches(&exact));
        assert!(!car.matches(&partial));
    }

    #[test]
    fn year_bounds_are_inclusive_and_independent() {
        // ---
        let car = sample_car("Batumi", 2018, 5);

        let only_from = CarFilter {
            year_from: Some(2018),
            ..CarFilter::default()
        };
        let only_to = CarFilter {
            year_to: Some(2018),
            ..CarFilter::default()
        };
        let outside = CarFilter {
            year_from: Some(2019),
            year_to: Some(2022),
            ..CarFilter::default()
        };

        assert!(car.matches(&only_from));
        assert!(car.matches(&only_to));
        assert!(!car.matches(&outside));
    }

    #[test]
    fn capacity_is_a_lower_bound() {
        // ---
        let car = sample_car("Batumi", 2018, 5);

        let fits = CarFilter {
            capacity_min: Some(5),
            ..CarFilter::default()
        };
        let too_small = CarFilter {
            capacity_min: Some(7),
            ..CarFilter::default()
        };

        assert!(car.matches(&fits));
        assert!(!car.matches(&too_small));
    }
}
