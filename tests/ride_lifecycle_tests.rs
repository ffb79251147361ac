mod common;

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use common::{start_time, TestApp};

use carpool_marketplace::models::booking::BookingStatus;
use carpool_marketplace::models::notification::NotificationKind;
use carpool_marketplace::models::ride::{RideSearch, RideStatus, MAX_RIDE_PRICE};
use carpool_marketplace::models::user::Role;
use carpool_marketplace::services::ride_lifecycle_service::HistoryScope;
use carpool_marketplace::utils::errors::AppError;

#[tokio::test]
async fn test_add_ride_charges_commission() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;

    let ride = app.publish_ride(&driver, 15, 3).await;

    assert_eq!(ride.status(), RideStatus::Disponible);
    assert_eq!(ride.available_seats(), 3);
    assert_eq!(ride.total_seats, 3);
    assert_eq!(ride.commission, 2);
    assert_eq!(app.credits_of(driver.id).await, 18);
    assert_eq!(app.sink.kinds_for(driver.id), vec![NotificationKind::RidePublished]);
}

#[tokio::test]
async fn test_add_ride_rejected_without_enough_credits() {
    let app = TestApp::new();
    let driver = app.user("broke", 1, &[Role::Driver]).await;

    let err = app
        .state
        .rides
        .add_ride(app.draft(start_time() + Duration::days(3), 10, 2), driver.id, driver.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientCredits { required: 2, available: 1 }));
    assert_eq!(app.credits_of(driver.id).await, 1);
    let rides = app
        .state
        .rides
        .rides_by_driver(driver.id, driver.id, HistoryScope::All)
        .await
        .unwrap();
    assert!(rides.is_empty());
}

#[tokio::test]
async fn test_add_ride_requires_driver_acting_for_themselves() {
    let app = TestApp::new();
    let passenger = app.passenger("pax", 20).await;
    let driver = app.driver("driver").await;
    let draft = app.draft(start_time() + Duration::days(3), 10, 2);

    let err = app
        .state
        .rides
        .add_ride(draft.clone(), passenger.id, passenger.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // un conductor no puede publicar en nombre de otro
    let err = app
        .state
        .rides
        .add_ride(draft, driver.id, passenger.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(app.credits_of(driver.id).await, 20);
}

#[tokio::test]
async fn test_add_ride_validates_draft() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;

    let past = app.draft(start_time() - Duration::hours(1), 10, 2);
    let err = app.state.rides.add_ride(past, driver.id, driver.id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let too_many_seats = app.draft(start_time() + Duration::days(1), 10, 7);
    let err = app
        .state
        .rides
        .add_ride(too_many_seats, driver.id, driver.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(app.credits_of(driver.id).await, 20);
}

#[tokio::test]
async fn test_book_ride_debits_passenger_and_takes_a_seat() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let passenger = app.passenger("pax", 30).await;
    let ride = app.publish_ride(&driver, 12, 2).await;

    let booking = app.book(&ride, &passenger).await.unwrap();

    assert_eq!(booking.status(), BookingStatus::Confirmed);
    assert_eq!(booking.driver_id(), driver.id);
    assert_eq!(app.credits_of(passenger.id).await, 18);
    // la reserva no mueve créditos del conductor
    assert_eq!(app.credits_of(driver.id).await, 18);

    let ride = app.ride(ride.id).await;
    assert_eq!(ride.available_seats(), 1);
    assert_eq!(ride.status(), RideStatus::Disponible);
    app.assert_seats_conserved(ride.id).await;

    assert_eq!(app.sink.kinds_for(passenger.id), vec![NotificationKind::BookingConfirmed]);
    assert!(app.sink.kinds_for(driver.id).contains(&NotificationKind::NewPassenger));
}

#[tokio::test]
async fn test_full_ride_cannot_be_oversold() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let first = app.passenger("first", 20).await;
    let second = app.passenger("second", 20).await;
    let ride = app.publish_ride(&driver, 5, 1).await;

    app.book(&ride, &first).await.unwrap();
    let err = app.book(&ride, &second).await.unwrap_err();

    assert!(matches!(err, AppError::RideFull));
    assert!(err.is_conflict());
    assert_eq!(app.credits_of(second.id).await, 20);

    let ride = app.ride(ride.id).await;
    assert_eq!(ride.status(), RideStatus::Complet);
    assert_eq!(ride.available_seats(), 0);
    assert_eq!(app.store.bookings_for_ride(ride.id).await.len(), 1);
    app.assert_seats_conserved(ride.id).await;
}

#[tokio::test]
async fn test_second_booking_by_same_passenger_is_rejected() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let passenger = app.passenger("pax", 50).await;
    let ride = app.publish_ride(&driver, 10, 3).await;

    app.book(&ride, &passenger).await.unwrap();
    let err = app.book(&ride, &passenger).await.unwrap_err();

    assert!(matches!(err, AppError::DuplicateBooking));
    assert_eq!(app.credits_of(passenger.id).await, 40);
    assert_eq!(app.ride(ride.id).await.available_seats(), 2);
}

#[tokio::test]
async fn test_driver_cannot_book_own_ride() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let ride = app.publish_ride(&driver, 3, 2).await;

    let err = app.book(&ride, &driver).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidRelationship(_)));
    assert_eq!(app.credits_of(driver.id).await, 18);
    assert_eq!(app.ride(ride.id).await.available_seats(), 2);
}

#[tokio::test]
async fn test_booking_requires_enough_credits() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let passenger = app.passenger("pax", 4).await;
    let ride = app.publish_ride(&driver, 5, 2).await;

    let err = app.book(&ride, &passenger).await.unwrap_err();

    assert!(matches!(err, AppError::InsufficientCredits { required: 5, available: 4 }));
    assert_eq!(app.credits_of(passenger.id).await, 4);
    assert!(app.store.bookings_for_ride(ride.id).await.is_empty());
}

#[tokio::test]
async fn test_booking_on_behalf_of_someone_else() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let passenger = app.passenger("pax", 20).await;
    let intruder = app.passenger("intruder", 20).await;
    let employee = app.employee().await;
    let ride = app.publish_ride(&driver, 5, 2).await;

    let err = app
        .state
        .rides
        .book_ride(ride.id, passenger.id, intruder.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let booking = app
        .state
        .rides
        .book_ride(ride.id, passenger.id, employee.id)
        .await
        .unwrap();
    assert_eq!(booking.passenger_id(), passenger.id);
    assert_eq!(app.credits_of(passenger.id).await, 15);
}

#[tokio::test]
async fn test_driver_cancellation_refunds_every_passenger() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let p1 = app.passenger("p1", 20).await;
    let p2 = app.passenger("p2", 20).await;
    let ride = app.publish_ride(&driver, 10, 3).await;
    let b1 = app.book(&ride, &p1).await.unwrap();
    let b2 = app.book(&ride, &p2).await.unwrap();

    let cancelled = app.state.rides.cancel_ride(ride.id, driver.id, driver.id).await.unwrap();

    assert_eq!(cancelled.status(), RideStatus::Annule);
    assert_eq!(cancelled.available_seats(), 3);
    assert_eq!(app.credits_of(p1.id).await, 20);
    assert_eq!(app.credits_of(p2.id).await, 20);
    // la comisión no se devuelve
    assert_eq!(app.credits_of(driver.id).await, 18);
    assert_eq!(app.booking(b1.id).await.status(), BookingStatus::Cancelled);
    assert_eq!(app.booking(b2.id).await.status(), BookingStatus::Cancelled);
    app.assert_seats_conserved(ride.id).await;

    assert!(app.sink.kinds_for(p1.id).contains(&NotificationKind::RideCancelled));
    assert!(app.sink.kinds_for(p2.id).contains(&NotificationKind::RideCancelled));
    assert!(app.sink.kinds_for(driver.id).contains(&NotificationKind::RideCancelled));
}

#[tokio::test]
async fn test_driver_cancels_a_full_ride() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let p1 = app.passenger("p1", 20).await;
    let p2 = app.passenger("p2", 20).await;
    let ride = app.publish_ride(&driver, 10, 2).await;
    app.book(&ride, &p1).await.unwrap();
    app.book(&ride, &p2).await.unwrap();
    assert_eq!(app.ride(ride.id).await.status(), RideStatus::Complet);

    let cancelled = app.state.rides.cancel_ride(ride.id, driver.id, driver.id).await.unwrap();

    assert_eq!(cancelled.status(), RideStatus::Annule);
    assert_eq!(cancelled.available_seats(), cancelled.total_seats);
    let stored = app.ride(ride.id).await;
    assert_eq!(stored.status(), RideStatus::Annule);
    assert_eq!(stored.available_seats(), 2);
    assert_eq!(app.credits_of(p1.id).await, 20);
    assert_eq!(app.credits_of(p2.id).await, 20);
    assert_eq!(app.credits_of(driver.id).await, 18);
    app.assert_seats_conserved(ride.id).await;
}

#[tokio::test]
async fn test_price_is_capped() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let departure = start_time() + Duration::days(3);

    for price in [MAX_RIDE_PRICE + 1, i64::MAX / 2 + 1] {
        let err = app
            .state
            .rides
            .add_ride(app.draft(departure, price, 2), driver.id, driver.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
    assert_eq!(app.credits_of(driver.id).await, 20);
}

#[tokio::test]
async fn test_finalize_at_maximum_price() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let p1 = app.passenger("p1", MAX_RIDE_PRICE).await;
    let p2 = app.passenger("p2", MAX_RIDE_PRICE).await;
    let ride = app.publish_ride(&driver, MAX_RIDE_PRICE, 2).await;
    app.book(&ride, &p1).await.unwrap();
    app.book(&ride, &p2).await.unwrap();

    app.state.rides.start_ride(ride.id, driver.id, driver.id).await.unwrap();
    let outcome = app.state.rides.finalize_ride(ride.id, driver.id, driver.id).await.unwrap();

    assert_eq!(outcome.driver_earnings, 2 * MAX_RIDE_PRICE);
    assert_eq!(app.credits_of(driver.id).await, 18 + 2 * MAX_RIDE_PRICE);
    assert_eq!(app.credits_of(p1.id).await, 0);
}

#[tokio::test]
async fn test_updates_are_stamped_with_the_clock() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let p1 = app.passenger("p1", 20).await;
    let ride = app.publish_ride(&driver, 5, 2).await;
    let booking = app.book(&ride, &p1).await.unwrap();

    app.clock.advance(Duration::hours(1));
    app.state.rides.cancel_ride(ride.id, driver.id, driver.id).await.unwrap();

    let expected = start_time() + Duration::hours(1);
    let ride = app.ride(ride.id).await;
    assert_eq!(ride.updated_at, expected);
    assert!(ride.updated_at >= ride.created_at);
    let booking = app.booking(booking.id).await;
    assert_eq!(booking.updated_at, expected);
    assert!(booking.updated_at >= booking.created_at);
}

#[tokio::test]
async fn test_only_the_driver_controls_the_ride() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let other = app.driver("other").await;
    let admin = app.admin().await;
    let ride = app.publish_ride(&driver, 10, 3).await;

    for caller in [other.id, admin.id] {
        let err = app.state.rides.cancel_ride(ride.id, driver.id, caller).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = app.state.rides.start_ride(ride.id, driver.id, caller).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    let err = app.state.rides.cancel_ride(ride.id, other.id, other.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(app.ride(ride.id).await.status(), RideStatus::Disponible);
}

#[tokio::test]
async fn test_start_and_finalize_pay_the_driver() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let p1 = app.passenger("p1", 20).await;
    let p2 = app.passenger("p2", 20).await;
    let ride = app.publish_ride(&driver, 7, 2).await;
    let b1 = app.book(&ride, &p1).await.unwrap();
    let b2 = app.book(&ride, &p2).await.unwrap();
    assert_eq!(app.ride(ride.id).await.status(), RideStatus::Complet);

    let started = app.state.rides.start_ride(ride.id, driver.id, driver.id).await.unwrap();
    assert_eq!(started.status(), RideStatus::EnCours);
    assert_eq!(app.sink.kinds_for(p1.id).last(), Some(&NotificationKind::RideStarted));

    let outcome = app.state.rides.finalize_ride(ride.id, driver.id, driver.id).await.unwrap();

    assert_eq!(outcome.ride.status(), RideStatus::Termine);
    assert_eq!(outcome.completed_bookings, 2);
    assert_eq!(outcome.driver_earnings, 14);
    assert_eq!(app.credits_of(driver.id).await, 18 + 14);
    assert_eq!(app.credits_of(p1.id).await, 13);
    assert_eq!(app.booking(b1.id).await.status(), BookingStatus::Past);
    assert_eq!(app.booking(b2.id).await.status(), BookingStatus::Past);
    app.assert_seats_conserved(ride.id).await;
    assert!(app.sink.kinds_for(driver.id).contains(&NotificationKind::RideFinalized));
}

#[tokio::test]
async fn test_finished_and_cancelled_rides_are_frozen() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let passenger = app.passenger("pax", 20).await;

    let finished = app.publish_ride(&driver, 5, 2).await;
    app.state.rides.start_ride(finished.id, driver.id, driver.id).await.unwrap();
    app.state.rides.finalize_ride(finished.id, driver.id, driver.id).await.unwrap();

    let err = app.state.rides.cancel_ride(finished.id, driver.id, driver.id).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));
    let err = app.state.rides.start_ride(finished.id, driver.id, driver.id).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));
    let err = app.state.rides.finalize_ride(finished.id, driver.id, driver.id).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));
    let err = app.book(&finished, &passenger).await.unwrap_err();
    assert!(err.is_conflict());

    let cancelled = app.publish_ride(&driver, 5, 2).await;
    app.state.rides.cancel_ride(cancelled.id, driver.id, driver.id).await.unwrap();
    let err = app.state.rides.start_ride(cancelled.id, driver.id, driver.id).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));
    let err = app.state.rides.cancel_ride(cancelled.id, driver.id, driver.id).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));

    assert_eq!(app.ride(finished.id).await.status(), RideStatus::Termine);
    assert_eq!(app.ride(cancelled.id).await.status(), RideStatus::Annule);
    assert_eq!(app.credits_of(passenger.id).await, 20);
}

#[tokio::test]
async fn test_started_ride_cannot_be_booked_or_cancelled() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let passenger = app.passenger("pax", 20).await;
    let ride = app.publish_ride(&driver, 5, 3).await;
    app.state.rides.start_ride(ride.id, driver.id, driver.id).await.unwrap();

    let err = app.book(&ride, &passenger).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));
    assert_eq!(app.credits_of(passenger.id).await, 20);

    let err = app.state.rides.cancel_ride(ride.id, driver.id, driver.id).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));
}

#[tokio::test]
async fn test_unknown_ride_is_not_found() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let passenger = app.passenger("pax", 20).await;
    let missing = uuid::Uuid::new_v4();

    assert!(matches!(
        app.state.rides.book_ride(missing, passenger.id, passenger.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        app.state.rides.start_ride(missing, driver.id, driver.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(app.state.rides.get_ride(missing).await, Err(AppError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_on_last_seat() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let ride = app.publish_ride(&driver, 4, 1).await;

    let mut passengers = Vec::new();
    for i in 0..10 {
        passengers.push(app.passenger(&format!("racer{}", i), 10).await);
    }

    let rides = Arc::clone(&app.state.rides);
    let handles: Vec<_> = passengers
        .iter()
        .map(|p| {
            let rides = Arc::clone(&rides);
            let (ride_id, passenger_id) = (ride.id, p.id);
            tokio::spawn(async move { rides.book_ride(ride_id, passenger_id, passenger_id).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert!(matches!(e, AppError::RideFull), "unexpected error {:?}", e),
        }
    }

    assert_eq!(successes, 1);
    let ride = app.ride(ride.id).await;
    assert_eq!(ride.available_seats(), 0);
    assert_eq!(ride.status(), RideStatus::Complet);
    app.assert_seats_conserved(ride.id).await;

    let mut total = 0;
    for p in &passengers {
        total += app.credits_of(p.id).await;
    }
    assert_eq!(total, 10 * 10 - 4);
}

#[tokio::test]
async fn test_failed_notifications_do_not_undo_the_booking() {
    let app = TestApp::with_failing_notifications();
    let driver = app.driver("driver").await;
    let passenger = app.passenger("pax", 20).await;
    let ride = app.publish_ride(&driver, 6, 2).await;

    let booking = app.book(&ride, &passenger).await.unwrap();

    assert_eq!(app.booking(booking.id).await.status(), BookingStatus::Confirmed);
    assert_eq!(app.credits_of(passenger.id).await, 14);
    assert_eq!(app.ride(ride.id).await.available_seats(), 1);
}

#[tokio::test]
async fn test_histories_are_scoped_to_owner_or_staff() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let passenger = app.passenger("pax", 50).await;
    let stranger = app.passenger("stranger", 0).await;
    let employee = app.employee().await;

    let upcoming = app.publish_ride(&driver, 5, 2).await;
    let done = app.publish_ride(&driver, 5, 2).await;
    let cancelled = app.publish_ride(&driver, 5, 2).await;
    app.book(&upcoming, &passenger).await.unwrap();
    app.book(&done, &passenger).await.unwrap();
    app.book(&cancelled, &passenger).await.unwrap();
    app.state.rides.start_ride(done.id, driver.id, driver.id).await.unwrap();
    app.state.rides.finalize_ride(done.id, driver.id, driver.id).await.unwrap();
    app.state.rides.cancel_ride(cancelled.id, driver.id, driver.id).await.unwrap();

    let rides = &app.state.rides;
    assert_eq!(rides.rides_by_driver(driver.id, driver.id, HistoryScope::All).await.unwrap().len(), 3);
    let up = rides.rides_by_driver(driver.id, driver.id, HistoryScope::Upcoming).await.unwrap();
    assert_eq!(up.iter().map(|r| r.id).collect::<Vec<_>>(), vec![upcoming.id]);
    assert_eq!(rides.rides_by_driver(driver.id, employee.id, HistoryScope::Past).await.unwrap().len(), 2);

    let mine = rides.rides_by_passenger(passenger.id, passenger.id, HistoryScope::Upcoming).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].ride.id, upcoming.id);
    let past = rides.rides_by_passenger(passenger.id, passenger.id, HistoryScope::Past).await.unwrap();
    assert_eq!(past.len(), 2);

    assert!(matches!(
        rides.rides_by_passenger(passenger.id, stranger.id, HistoryScope::All).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        rides.rides_by_driver(driver.id, stranger.id, HistoryScope::All).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_admin_statistics() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let employee = app.employee().await;
    let driver = app.driver("driver").await;

    app.publish_ride(&driver, 5, 2).await;
    app.publish_ride(&driver, 8, 3).await;
    app.clock.advance(Duration::days(1));
    app.publish_ride(&driver, 8, 3).await;

    let today = app.state.rides.rides_today(admin.id).await.unwrap();
    assert_eq!(today.total, 1);
    let commission_today = app.state.rides.commission_today(admin.id).await.unwrap();
    assert_eq!(commission_today.total, 2);

    let start = NaiveDate::from_ymd_opt(2030, 5, 30).unwrap();
    let end = NaiveDate::from_ymd_opt(2030, 6, 2).unwrap();
    let period = app.state.rides.rides_over_period(start, end, admin.id).await.unwrap();
    assert_eq!(period.total, 3);
    assert_eq!(period.daily.len(), 2);
    assert_eq!(period.daily[0].day, NaiveDate::from_ymd_opt(2030, 6, 1).unwrap());
    assert_eq!(period.daily[0].value, 2);

    let commission = app.state.rides.commission_over_period(start, end, admin.id).await.unwrap();
    assert_eq!(commission.total, 6);

    // límites inclusivos
    let first_day = NaiveDate::from_ymd_opt(2030, 6, 1).unwrap();
    let single = app.state.rides.rides_over_period(first_day, first_day, admin.id).await.unwrap();
    assert_eq!(single.total, 2);

    assert!(matches!(
        app.state.rides.rides_over_period(end, start, admin.id).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        app.state.rides.rides_today(employee.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        app.state.rides.commission_today(driver.id).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_search_returns_bookable_rides_only() {
    let app = TestApp::new();
    let driver = app.driver("driver").await;
    let passenger = app.passenger("pax", 50).await;
    let departure = start_time() + Duration::days(4);

    let cheap = app.publish_ride_at(&driver, departure, 5, 2).await;
    let pricey = app.publish_ride_at(&driver, departure + Duration::hours(2), 30, 2).await;
    let full = app.publish_ride_at(&driver, departure + Duration::hours(3), 5, 1).await;
    app.book(&full, &passenger).await.unwrap();
    app.publish_ride_at(&driver, departure + Duration::days(1), 5, 2).await;

    let search = RideSearch {
        departure_place: "paris".to_string(),
        arrival_place: " LYON ".to_string(),
        date: departure.date_naive(),
        max_price: None,
    };
    let found = app.state.rides.search_rides(search.clone()).await.unwrap();
    assert_eq!(found.iter().map(|r| r.id).collect::<Vec<_>>(), vec![cheap.id, pricey.id]);

    let capped = RideSearch {
        max_price: Some(10),
        ..search
    };
    let found = app.state.rides.search_rides(capped).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, cheap.id);
}
