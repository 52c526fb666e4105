//! Proximity alerts: compare a user's last known position against public
//! trips and dispatch a `nearby_trip` notification for new matches.
//!
//! Linear scan over the candidate set; fine at current scale, and the
//! periodic-job seam in `background` is where a spatial index would slot in.

use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::geo::haversine_distance_m;
use crate::trips::repo::Trip;

use super::dispatch::{Dispatcher, NotificationKind};
use super::repo::{Notification, UserLocation, UserSettings};

/// A `nearby_trip` notification for the same (user, trip) pair is not
/// repeated within this window.
pub const RESEND_WINDOW_HOURS: i64 = 24;

/// Trips within `radius_m` of the given position, with their distances.
/// Trips lacking coordinates are skipped.
pub fn nearby_candidates(
    latitude: f64,
    longitude: f64,
    trips: &[Trip],
    radius_m: f64,
) -> Vec<(&Trip, f64)> {
    trips
        .iter()
        .filter_map(|trip| {
            let (lat, lon) = (trip.latitude?, trip.longitude?);
            let distance = haversine_distance_m(latitude, longitude, lat, lon);
            (distance <= radius_m).then_some((trip, distance))
        })
        .collect()
}

/// Check one user's position against all public trips and dispatch alerts
/// for matches not already notified within the resend window.
#[instrument(skip(db, dispatcher))]
pub async fn check_and_notify(
    db: &PgPool,
    dispatcher: &Dispatcher,
    user_id: Uuid,
    default_radius_m: i32,
) -> anyhow::Result<()> {
    let Some(location) = UserLocation::find(db, user_id).await? else {
        return Ok(());
    };

    let radius_m = UserSettings::find(db, user_id)
        .await?
        .map(|s| s.nearby_radius_m)
        .unwrap_or(default_radius_m) as f64;

    let trips = Trip::public_with_coordinates(db, user_id).await?;
    let candidates = nearby_candidates(location.latitude, location.longitude, &trips, radius_m);
    debug!(
        user_id = %user_id,
        candidates = candidates.len(),
        radius_m,
        "proximity scan"
    );

    for (trip, distance_m) in candidates {
        let already_sent =
            Notification::recent_exists(db, user_id, "nearby_trip", trip.id, RESEND_WINDOW_HOURS)
                .await?;
        if already_sent {
            continue;
        }
        dispatcher
            .send(
                user_id,
                NotificationKind::NearbyTrip {
                    trip_id: trip.id,
                    trip_title: trip.title.clone(),
                    distance_m,
                },
            )
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn trip(title: &str, latitude: Option<f64>, longitude: Option<f64>) -> Trip {
        Trip {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            latitude,
            longitude,
            is_public: true,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn finds_trips_within_radius() {
        // User in central Zurich, one trip ~170 m away, one in Bern
        let trips = vec![
            trip("Lindenhof picnic", Some(47.3779), Some(8.5400)),
            trip("Bern old town", Some(46.9480), Some(7.4474)),
        ];

        let hits = nearby_candidates(47.3769, 8.5417, &trips, 5000.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.title, "Lindenhof picnic");
        assert!(hits[0].1 < 5000.0);
    }

    #[test]
    fn skips_trips_without_coordinates() {
        let trips = vec![
            trip("no coords", None, None),
            trip("half coords", Some(47.38), None),
        ];
        assert!(nearby_candidates(47.3769, 8.5417, &trips, 5000.0).is_empty());
    }

    #[test]
    fn radius_is_a_hard_cutoff() {
        let trips = vec![trip("Bern old town", Some(46.9480), Some(7.4474))];
        assert!(nearby_candidates(47.3769, 8.5417, &trips, 5000.0).is_empty());
        // ~95 km away, so a generous radius matches it
        assert_eq!(nearby_candidates(47.3769, 8.5417, &trips, 100_000.0).len(), 1);
    }

    #[test]
    fn reports_distance_in_meters() {
        let trips = vec![trip("Lindenhof picnic", Some(47.3779), Some(8.5400))];
        let hits = nearby_candidates(47.3769, 8.5417, &trips, 5000.0);
        assert!(hits[0].1 > 100.0 && hits[0].1 < 300.0, "got {}", hits[0].1);
    }
}
