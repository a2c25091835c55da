use crate::models::stop::{to_feature_collection, Stop};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Labelled synthetic distance range, e.g. `From 0->1km`, with its request count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceBin {
    pub from_km: u32,
    pub to_km: u32,
    pub count: u64,
}

impl DistanceBin {
    pub fn label(&self) -> String {
        format!("From {}->{}km", self.from_km, self.to_km)
    }
}

/// Output of one simulation: binned counts and two independent stop samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub distance_bins: Vec<DistanceBin>,
    pub pickup_points: Vec<Stop>,
    pub dropoff_points: Vec<Stop>,
}

impl SimulationResult {
    pub fn total_binned(&self) -> u64 {
        self.distance_bins.iter().map(|b| b.count).sum()
    }
}

/// Bins serialise as an ordered `label -> count` object.
struct Bins<'a>(&'a [DistanceBin]);

impl Serialize for Bins<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for bin in self.0 {
            map.serialize_entry(&bin.label(), &bin.count)?;
        }
        map.end()
    }
}

impl Serialize for SimulationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SimulationResult", 3)?;
        state.serialize_field("booking_distance_bins", &Bins(&self.distance_bins))?;
        state.serialize_field(
            "most_popular_dropoff_points",
            &to_feature_collection(&self.dropoff_points),
        )?;
        state.serialize_field(
            "most_popular_pickup_points",
            &to_feature_collection(&self.pickup_points),
        )?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SimulationResult {
        SimulationResult {
            distance_bins: vec![
                DistanceBin { from_km: 0, to_km: 1, count: 1 },
                DistanceBin { from_km: 1, to_km: 2, count: 1 },
                DistanceBin { from_km: 2, to_km: 3, count: 2 },
                DistanceBin { from_km: 3, to_km: 4, count: 2 },
            ],
            pickup_points: vec![Stop::new("p", 13.4, 52.54)],
            dropoff_points: vec![],
        }
    }

    #[test]
    fn serialises_to_three_keys() {
        let value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(value["booking_distance_bins"]["From 2->3km"], 2);
        assert_eq!(value["most_popular_pickup_points"]["features"][0]["id"], "p");
        assert_eq!(
            value["most_popular_dropoff_points"]["features"]
                .as_array()
                .unwrap()
                .len(),
            0
        );
    }

    #[test]
    fn labels_and_totals() {
        let result = sample();
        assert_eq!(result.distance_bins[3].label(), "From 3->4km");
        assert_eq!(result.total_binned(), 6);
    }
}
