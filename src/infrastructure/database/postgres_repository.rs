use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Car, CarAttributes, CarFilter, DuplicateField, NewUser, Rental, Repository, RepositoryPtr,
    User,
};

const USER_COLUMNS: &str = "id, phone_number, first_name, last_name, email, password_hash, \
     is_active, is_staff, is_superuser, date_joined, last_login";

const CAR_COLUMNS: &str = "c.id, c.owner_id, c.brand, c.model, c.year, c.daily_rental_price, \
     c.capacity, c.transmission, c.city, c.fuel_tank, c.image1, c.image2, c.image3, c.listed_at";

const RENTAL_COLUMNS: &str =
    "id, renter_id, car_id, start_date, end_date, total_price, booked_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    phone_number: String,
    first_name: String,
    last_name: Option<String>,
    email: String,
    password_hash: String,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    date_joined: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        // ---
        User {
            id: r.id,
            phone_number: r.phone_number,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            password_hash: r.password_hash,
            is_active: r.is_active,
            is_staff: r.is_staff,
            is_superuser: r.is_superuser,
            date_joined: r.date_joined,
            last_login: r.last_login,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CarRow {
    id: Uuid,
    owner_id: Uuid,
    brand: String,
    model: String,
    year: i16,
    daily_rental_price: Decimal,
    capacity: i16,
    transmission: String,
    city: String,
    fuel_tank: i32,
    image1: String,
    image2: Option<String>,
    image3: Option<String>,
    listed_at: DateTime<Utc>,
}

impl TryFrom<CarRow> for Car {
    type Error = anyhow::Error;

    fn try_from(r: CarRow) -> Result<Self> {
        // ---
        let transmission = r
            .transmission
            .parse()
            .map_err(|e: String| anyhow::anyhow!("car {}: {e}", r.id))?;

        Ok(Car {
            id: r.id,
            owner_id: r.owner_id,
            attributes: CarAttributes {
                brand: r.brand,
                model: r.model,
                year: r.year,
                daily_rental_price: r.daily_rental_price,
                capacity: r.capacity,
                transmission,
                city: r.city,
                fuel_tank: r.fuel_tank,
                image1: r.image1,
                image2: r.image2,
                image3: r.image3,
            },
            listed_at: r.listed_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RankedCarRow {
    #[sqlx(flatten)]
    car: CarRow,
    likes: i64,
}

#[derive(sqlx::FromRow)]
struct RentalRow {
    id: Uuid,
    renter_id: Uuid,
    car_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_price: Decimal,
    booked_at: DateTime<Utc>,
}

impl From<RentalRow> for Rental {
    fn from(r: RentalRow) -> Self {
        // ---
        Rental {
            id: r.id,
            renter_id: r.renter_id,
            car_id: r.car_id,
            start_date: r.start_date,
            end_date: r.end_date,
            total_price: r.total_price,
            booked_at: r.booked_at,
        }
    }
}

fn cars_from_rows(rows: Vec<CarRow>) -> Result<Vec<Car>> {
    rows.into_iter().map(Car::try_from).collect()
}

/// Maps unique-constraint violations on `users` to [`DuplicateField`].
fn map_user_insert_error(err: sqlx::Error) -> anyhow::Error {
    // ---
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("users_phone_number_key") => {
                    return DuplicateField {
                        field: "phone_number",
                    }
                    .into()
                }
                Some("users_email_key") => return DuplicateField { field: "email" }.into(),
                _ => {}
            }
        }
    }
    anyhow::Error::new(err).context("insert user")
}

pub fn create_postgres_repository(pool: PgPool) -> RepositoryPtr {
    // ---
    Arc::new(PostgresRepository::new(pool))
}

pub struct PostgresRepository {
    // ---
    pool: PgPool,
}

impl PostgresRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepository {
    // ---
    async fn ping(&self) -> Result<()> {
        // ---
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        // ---
        let user = new_user.into_user();

        sqlx::query(
            "INSERT INTO users (id, phone_number, first_name, last_name, email, password_hash,
                                is_active, is_staff, is_superuser, date_joined, last_login)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(user.id)
        .bind(&user.phone_number)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.date_joined)
        .bind(user.last_login)
        .execute(&self.pool)
        .await
        .map_err(map_user_insert_error)?;

        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn get_user_by_phone(&self, phone_number: &str) -> Result<Option<User>> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone_number = $1"
        ))
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        // ---
        sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(at)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_car(&self, car: Car) -> Result<Car> {
        // ---
        let a = &car.attributes;

        sqlx::query(
            "INSERT INTO cars (id, owner_id, brand, model, year, daily_rental_price, capacity,
                               transmission, city, fuel_tank, image1, image2, image3, listed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(car.id)
        .bind(car.owner_id)
        .bind(&a.brand)
        .bind(&a.model)
        .bind(a.year)
        .bind(a.daily_rental_price)
        .bind(a.capacity)
        .bind(a.transmission.as_str())
        .bind(&a.city)
        .bind(a.fuel_tank)
        .bind(&a.image1)
        .bind(&a.image2)
        .bind(&a.image3)
        .bind(car.listed_at)
        .execute(&self.pool)
        .await
        .context("insert car")?;

        Ok(car)
    }

    async fn get_car(&self, car_id: Uuid) -> Result<Option<Car>> {
        // ---
        let row = sqlx::query_as::<_, CarRow>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars c WHERE c.id = $1"
        ))
        .bind(car_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Car::try_from).transpose()
    }

    async fn update_car(&self, car_id: Uuid, attributes: CarAttributes) -> Result<Option<Car>> {
        // ---
        let a = &attributes;

        let row = sqlx::query_as::<_, CarRow>(&format!(
            "UPDATE cars c
                SET brand = $2, model = $3, year = $4, daily_rental_price = $5, capacity = $6,
                    transmission = $7, city = $8, fuel_tank = $9,
                    image1 = $10, image2 = $11, image3 = $12
              WHERE c.id = $1
          RETURNING {CAR_COLUMNS}"
        ))
        .bind(car_id)
        .bind(&a.brand)
        .bind(&a.model)
        .bind(a.year)
        .bind(a.daily_rental_price)
        .bind(a.capacity)
        .bind(a.transmission.as_str())
        .bind(&a.city)
        .bind(a.fuel_tank)
        .bind(&a.image1)
        .bind(&a.image2)
        .bind(&a.image3)
        .fetch_optional(&self.pool)
        .await
        .context("update car")?;

        row.map(Car::try_from).transpose()
    }

    async fn delete_car(&self, car_id: Uuid) -> Result<bool> {
        // ---
        // rentals and car_likes go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(car_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<Car>> {
        // ---
        let rows = sqlx::query_as::<_, CarRow>(&format!(
            "SELECT {CAR_COLUMNS}
               FROM cars c
              WHERE ($1::TEXT IS NULL OR LOWER(c.city) = LOWER($1))
                AND ($2::BIGINT IS NULL OR c.year >= $2)
                AND ($3::BIGINT IS NULL OR c.year <= $3)
                AND ($4::BIGINT IS NULL OR c.capacity >= $4)
              ORDER BY c.listed_at, c.id"
        ))
        .bind(&filter.city)
        .bind(filter.year_from)
        .bind(filter.year_to)
        .bind(filter.capacity_min)
        .fetch_all(&self.pool)
        .await?;

        cars_from_rows(rows)
    }

    async fn list_cars_by_owner(&self, owner_id: Uuid) -> Result<Vec<Car>> {
        // ---
        let rows = sqlx::query_as::<_, CarRow>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars c WHERE c.owner_id = $1 ORDER BY c.listed_at, c.id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        cars_from_rows(rows)
    }

    async fn most_liked_cars(&self, limit: usize) -> Result<Vec<(Car, i64)>> {
        // ---
        let rows = sqlx::query_as::<_, RankedCarRow>(&format!(
            "SELECT {CAR_COLUMNS}, COUNT(l.user_id) AS likes
               FROM cars c
               LEFT JOIN car_likes l ON l.car_id = c.id
              GROUP BY c.id
              ORDER BY likes DESC, c.listed_at, c.id
              LIMIT $1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| Ok((Car::try_from(r.car)?, r.likes)))
            .collect()
    }

    async fn toggle_like(&self, user_id: Uuid, car_id: Uuid) -> Result<bool> {
        // ---
        let mut tx = self.pool.begin().await.context("begin tx")?;

        let removed = sqlx::query("DELETE FROM car_likes WHERE user_id = $1 AND car_id = $2")
            .bind(user_id)
            .bind(car_id)
            .execute(&mut *tx)
            .await
            .context("remove like")?
            .rows_affected();

        if removed == 0 {
            sqlx::query(
                "INSERT INTO car_likes (user_id, car_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(car_id)
            .execute(&mut *tx)
            .await
            .context("add like")?;
        }

        tx.commit().await.context("commit tx")?;

        Ok(removed == 0)
    }

    async fn liked_cars(&self, user_id: Uuid) -> Result<Vec<Car>> {
        // ---
        let rows = sqlx::query_as::<_, CarRow>(&format!(
            "SELECT {CAR_COLUMNS}
               FROM cars c
               JOIN car_likes l ON l.car_id = c.id
              WHERE l.user_id = $1
              ORDER BY c.listed_at, c.id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        cars_from_rows(rows)
    }

    async fn liked_by(&self, car_id: Uuid) -> Result<Vec<Uuid>> {
        // ---
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM car_likes WHERE car_id = $1")
            .bind(car_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn create_rental(&self, rental: Rental) -> Result<Rental> {
        // ---
        sqlx::query(
            "INSERT INTO rentals (id, renter_id, car_id, start_date, end_date, total_price, booked_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(rental.id)
        .bind(rental.renter_id)
        .bind(rental.car_id)
        .bind(rental.start_date)
        .bind(rental.end_date)
        .bind(rental.total_price)
        .bind(rental.booked_at)
        .execute(&self.pool)
        .await
        .context("insert rental")?;

        Ok(rental)
    }

    async fn rentals_for_renter(&self, renter_id: Uuid) -> Result<Vec<Rental>> {
        // ---
        let rows = sqlx::query_as::<_, RentalRow>(&format!(
            "SELECT {RENTAL_COLUMNS} FROM rentals
              WHERE renter_id = $1
              ORDER BY start_date DESC, booked_at DESC"
        ))
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Rental::from).collect())
    }
}
