use crate::constants::{BOOKING_DISTANCE_DISTRIBUTION, MAX_SAMPLE_CAP};
use crate::error::Result;
use crate::models::{BoundingBox, DistanceBin, SimulationResult, Stop};
use geo::Contains;
use rand::{rngs::StdRng, seq::index, SeedableRng};

/// Produces synthetic booking statistics for a bounding box.
///
/// No trips are routed: the distance bins are fixed shares of the request
/// count, and the "most popular" pickups and dropoffs are random stops inside
/// the box.
pub struct Simulator<'a> {
    stops: &'a [Stop],
    rng: StdRng,
}

impl<'a> Simulator<'a> {
    pub fn new(stops: &'a [Stop], seed: u64) -> Self {
        Simulator {
            stops,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn simulate(
        &mut self,
        bounding_box: &BoundingBox,
        number_of_requests: u32,
    ) -> Result<SimulationResult> {
        let distance_bins = booking_distance_bins(number_of_requests);
        let sample_size = (number_of_requests as usize).min(MAX_SAMPLE_CAP);

        let dropoff_points = self.sample_points(bounding_box, sample_size)?;
        let pickup_points = self.sample_points(bounding_box, sample_size)?;

        tracing::info!(
            requests = number_of_requests,
            pickups = pickup_points.len(),
            dropoffs = dropoff_points.len(),
            "Simulated {} requests: {} pickups, {} dropoffs",
            number_of_requests,
            pickup_points.len(),
            dropoff_points.len()
        );

        Ok(SimulationResult {
            distance_bins,
            pickup_points,
            dropoff_points,
        })
    }

    /// Up to `n` distinct stops strictly inside the box, chosen uniformly.
    ///
    /// With fewer than `n` candidates every candidate is returned, in table order.
    pub fn sample_points(&mut self, bounding_box: &BoundingBox, n: usize) -> Result<Vec<Stop>> {
        let candidates = stops_within(self.stops, bounding_box)?;

        if candidates.len() < n {
            tracing::debug!(
                available = candidates.len(),
                requested = n,
                "Fewer stops in bounding box than requested"
            );
            return Ok(candidates.into_iter().cloned().collect());
        }

        Ok(index::sample(&mut self.rng, candidates.len(), n)
            .into_iter()
            .map(|i| candidates[i].clone())
            .collect())
    }
}

/// `round(n * w)` for every weight, independently, with halves going to the
/// even neighbour. The sum may drift from `n`.
pub fn booking_distance_bins(number_of_requests: u32) -> Vec<DistanceBin> {
    BOOKING_DISTANCE_DISTRIBUTION
        .iter()
        .enumerate()
        .map(|(i, weight)| DistanceBin {
            from_km: i as u32,
            to_km: i as u32 + 1,
            count: (f64::from(number_of_requests) * weight).round_ties_even() as u64,
        })
        .collect()
}

/// Stops lying in the interior of the box; points on its edge are excluded.
pub fn stops_within<'s>(stops: &'s [Stop], bounding_box: &BoundingBox) -> Result<Vec<&'s Stop>> {
    let polygon = bounding_box.to_polygon()?;
    Ok(stops
        .iter()
        .filter(|stop| polygon.contains(&stop.position))
        .collect())
}
