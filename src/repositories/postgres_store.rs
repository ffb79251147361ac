//! Almacén PostgreSQL
//!
//! Cada unidad de trabajo es una transacción sqlx. Las lecturas `lock_*`
//! usan `SELECT ... FOR UPDATE`; el trajet se bloquea siempre antes que
//! los usuarios, y los usuarios en orden de id.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::booking::{Booking, NewBooking, PassengerRide};
use crate::models::notification::{Notification, StoredNotification};
use crate::models::review::{NewReview, Review};
use crate::models::ride::{NewRide, Ride, RideSearch};
use crate::models::stats::DailyStat;
use crate::models::user::{User, UserRow};
use crate::repositories::store::{CarpoolStore, StoreTransaction};
use crate::utils::errors::{not_found_error, AppError, AppResult};

const RIDE_COLUMNS: &str = "id, driver_id, departure_place, arrival_place, departure_date_time, \
     arrival_date_time, price, total_seats, available_seats, status, commission, created_at, updated_at";

const BOOKING_COLUMNS: &str = "id, ride_id, passenger_id, driver_id, status, created_at, updated_at";

const USER_COLUMNS: &str = "id, pseudo, email, credits, roles, licence_number, created_at";

const REVIEW_COLUMNS: &str =
    "id, booking_id, ride_id, author_id, driver_id, rating, comment, status, created_at, updated_at";

fn into_users(rows: Vec<UserRow>) -> AppResult<Vec<User>> {
    rows.into_iter().map(User::try_from).collect()
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarpoolStore for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn find_ride(&self, ride_id: Uuid) -> AppResult<Option<Ride>> {
        let ride = sqlx::query_as::<_, Ride>(&format!("SELECT {} FROM rides WHERE id = $1", RIDE_COLUMNS))
            .bind(ride_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ride)
    }

    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let booking =
            sqlx::query_as::<_, Booking>(&format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS))
                .bind(booking_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(booking)
    }

    async fn rides_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<Ride>> {
        let rides = sqlx::query_as::<_, Ride>(&format!(
            "SELECT {} FROM rides WHERE driver_id = $1 ORDER BY departure_date_time",
            RIDE_COLUMNS
        ))
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rides)
    }

    async fn rides_by_passenger(&self, passenger_id: Uuid) -> AppResult<Vec<PassengerRide>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE passenger_id = $1",
            BOOKING_COLUMNS
        ))
        .bind(passenger_id)
        .fetch_all(&self.pool)
        .await?;

        let ride_ids: Vec<Uuid> = bookings.iter().map(|b| b.ride_id()).collect();
        let rides = sqlx::query_as::<_, Ride>(&format!("SELECT {} FROM rides WHERE id = ANY($1)", RIDE_COLUMNS))
            .bind(&ride_ids)
            .fetch_all(&self.pool)
            .await?;
        let rides: HashMap<Uuid, Ride> = rides.into_iter().map(|r| (r.id, r)).collect();

        let mut entries: Vec<PassengerRide> = bookings
            .into_iter()
            .filter_map(|booking| {
                rides.get(&booking.ride_id()).map(|ride| PassengerRide {
                    ride: ride.clone(),
                    booking,
                })
            })
            .collect();
        entries.sort_by_key(|e| e.ride.departure_date_time);

        Ok(entries)
    }

    async fn search_rides(&self, search: &RideSearch) -> AppResult<Vec<Ride>> {
        let rides = sqlx::query_as::<_, Ride>(&format!(
            r#"
            SELECT {}
            FROM rides
            WHERE status = 'disponible'
              AND available_seats > 0
              AND lower(departure_place) = lower($1)
              AND lower(arrival_place) = lower($2)
              AND (departure_date_time AT TIME ZONE 'UTC')::date = $3
              AND ($4::BIGINT IS NULL OR price <= $4)
            ORDER BY departure_date_time
            "#,
            RIDE_COLUMNS
        ))
        .bind(search.departure_place.trim())
        .bind(search.arrival_place.trim())
        .bind(search.date)
        .bind(search.max_price)
        .fetch_all(&self.pool)
        .await?;

        Ok(rides)
    }

    async fn daily_ride_counts(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyStat>> {
        let stats = sqlx::query_as::<_, DailyStat>(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*)::BIGINT AS value
            FROM rides
            WHERE (created_at AT TIME ZONE 'UTC')::date BETWEEN $1 AND $2
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn daily_commission(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyStat>> {
        let stats = sqlx::query_as::<_, DailyStat>(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COALESCE(SUM(commission), 0)::BIGINT AS value
            FROM rides
            WHERE (created_at AT TIME ZONE 'UTC')::date BETWEEN $1 AND $2
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn pending_reviews(&self) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE status = 'pending' ORDER BY created_at",
            REVIEW_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn push_notification(&self, notification: &Notification) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, ride_id, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(notification.kind.as_str())
        .bind(notification.ride_id)
        .bind(&notification.message)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn notifications_for(&self, user_id: Uuid) -> AppResult<Vec<StoredNotification>> {
        let notifications = sqlx::query_as::<_, StoredNotification>(
            r#"
            SELECT id, user_id, kind, ride_id, message, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }
}

pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn lock_ride(&mut self, ride_id: Uuid) -> AppResult<Option<Ride>> {
        let ride = sqlx::query_as::<_, Ride>(&format!(
            "SELECT {} FROM rides WHERE id = $1 FOR UPDATE",
            RIDE_COLUMNS
        ))
        .bind(ride_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(ride)
    }

    async fn lock_user(&mut self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1 FOR UPDATE",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn lock_users(&mut self, user_ids: &[Uuid]) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            USER_COLUMNS
        ))
        .bind(user_ids)
        .fetch_all(&mut *self.tx)
        .await?;

        into_users(rows)
    }

    async fn lock_booking(&mut self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(booking)
    }

    async fn lock_review(&mut self, review_id: Uuid) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1 FOR UPDATE",
            REVIEW_COLUMNS
        ))
        .bind(review_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(review)
    }

    async fn confirmed_bookings_for_ride(&mut self, ride_id: Uuid) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE ride_id = $1 AND status = 'confirmed' ORDER BY created_at FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(ride_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(bookings)
    }

    async fn has_active_booking(&mut self, passenger_id: Uuid, ride_id: Uuid) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE passenger_id = $1 AND ride_id = $2 AND status <> 'cancelled')",
        )
        .bind(passenger_id)
        .bind(ride_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(result.0)
    }

    async fn review_exists_for_booking(&mut self, booking_id: Uuid) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM reviews WHERE booking_id = $1)")
            .bind(booking_id)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(result.0)
    }

    async fn insert_ride(&mut self, new_ride: &NewRide) -> AppResult<Ride> {
        let ride = sqlx::query_as::<_, Ride>(&format!(
            r#"
            INSERT INTO rides (id, driver_id, departure_place, arrival_place, departure_date_time,
                               arrival_date_time, price, total_seats, available_seats, status,
                               commission, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, 'disponible', $9, $10, $10)
            RETURNING {}
            "#,
            RIDE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new_ride.driver_id)
        .bind(&new_ride.departure_place)
        .bind(&new_ride.arrival_place)
        .bind(new_ride.departure_date_time)
        .bind(new_ride.arrival_date_time)
        .bind(new_ride.price)
        .bind(new_ride.total_seats)
        .bind(new_ride.commission)
        .bind(new_ride.created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(ride)
    }

    async fn update_ride(&mut self, ride: &Ride) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE rides SET available_seats = $2, status = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(ride.id)
        .bind(ride.available_seats())
        .bind(ride.status())
        .bind(ride.updated_at)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Ride", &ride.id.to_string()));
        }
        Ok(())
    }

    async fn insert_booking(&mut self, new_booking: &NewBooking) -> AppResult<Booking> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings (id, ride_id, passenger_id, driver_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new_booking.ride_id)
        .bind(new_booking.passenger_id)
        .bind(new_booking.driver_id)
        .bind(new_booking.status)
        .bind(new_booking.created_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| match &e {
            // índice único parcial sobre (passenger_id, ride_id) de reservas activas
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateBooking,
            _ => AppError::Database(e),
        })?;

        Ok(booking)
    }

    async fn update_booking(&mut self, booking: &Booking) -> AppResult<()> {
        let result = sqlx::query("UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(booking.id)
            .bind(booking.status())
            .bind(booking.updated_at)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Booking", &booking.id.to_string()));
        }
        Ok(())
    }

    async fn update_user_credits(&mut self, user: &User) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET credits = $2 WHERE id = $1")
            .bind(user.id)
            .bind(user.credits())
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("User", &user.id.to_string()));
        }
        Ok(())
    }

    async fn insert_review(&mut self, new_review: &NewReview) -> AppResult<Review> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (id, booking_id, ride_id, author_id, driver_id, rating, comment,
                                 status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8, $8)
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new_review.booking_id)
        .bind(new_review.ride_id)
        .bind(new_review.author_id)
        .bind(new_review.driver_id)
        .bind(new_review.rating)
        .bind(&new_review.comment)
        .bind(new_review.created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(review)
    }

    async fn update_review(&mut self, review: &Review) -> AppResult<()> {
        let result = sqlx::query("UPDATE reviews SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(review.id)
            .bind(review.status())
            .bind(review.updated_at)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Review", &review.id.to_string()));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
