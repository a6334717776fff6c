use quill::{model::Stop, shared::geo::Coordinate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopDto {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub coordinate: Coordinate,
    /// Meters from the queried point, when the stop came from a proximity search.
    pub distance: Option<f64>,
}

impl StopDto {
    pub fn from(stop: &Stop) -> Self {
        let id = stop.id.to_string();
        let name = stop.name.to_string();
        let code = stop.code.as_deref().map(str::to_string);
        let coordinate = stop.coordinate;
        Self {
            id,
            name,
            code,
            coordinate,
            distance: None,
        }
    }

    pub fn near(stop: &Stop, from: &Coordinate) -> Self {
        let mut dto = Self::from(stop);
        dto.distance = Some(from.euclidean_distance(&stop.coordinate).as_meters());
        dto
    }
}
