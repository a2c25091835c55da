use crate::models::BoundingBox;
use serde::Deserialize;

/// Body of `POST /api/v1/simulations`.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationRequest {
    /// `[x1, y1, x2, y2]` in WGS84 degrees.
    pub bounding_box: [f64; 4],
    pub number_of_requests: u32,
}

impl SimulationRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.number_of_requests == 0 {
            return Err("number_of_requests must be at least 1".to_string());
        }
        self.bbox().validate().map_err(|e| e.to_string())
    }

    pub fn bbox(&self) -> BoundingBox {
        let [x1, y1, x2, y2] = self.bounding_box;
        BoundingBox::new(x1, y1, x2, y2)
    }
}

/// Fields of the trigger form, kept as submitted so they can be re-rendered.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulationForm {
    #[serde(default)]
    pub x1: String,
    #[serde(default)]
    pub y1: String,
    #[serde(default)]
    pub x2: String,
    #[serde(default)]
    pub y2: String,
    #[serde(default)]
    pub number_of_requests: String,
}

impl SimulationForm {
    /// The Berlin example box with six requests.
    pub fn example() -> Self {
        SimulationForm {
            x1: "13.34014892578125".to_string(),
            y1: "52.52791908000258".to_string(),
            x2: "13.506317138671875".to_string(),
            y2: "52.562995039558004".to_string(),
            number_of_requests: "6".to_string(),
        }
    }

    /// Every field is required and must have the right type. Returns one
    /// message per failing field.
    pub fn validate(&self) -> Result<(BoundingBox, u32), Vec<String>> {
        let mut errors = Vec::new();

        let ordinates = [
            ("x1", &self.x1),
            ("y1", &self.y1),
            ("x2", &self.x2),
            ("y2", &self.y2),
        ];
        for (name, value) in ordinates {
            let value = value.trim();
            if value.is_empty() {
                errors.push(format!("{} is required", name));
            } else if !value.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
                errors.push(format!("{} must be a number", name));
            }
        }

        let count = self.number_of_requests.trim();
        let number_of_requests = if count.is_empty() {
            errors.push("number_of_requests is required".to_string());
            None
        } else {
            match count.parse::<u32>() {
                Ok(n) if n >= 1 => Some(n),
                _ => {
                    errors.push("number_of_requests must be a positive integer".to_string());
                    None
                }
            }
        };

        match number_of_requests {
            Some(n) if errors.is_empty() => Ok((
                BoundingBox::parse([
                    self.x1.as_str(),
                    self.y1.as_str(),
                    self.x2.as_str(),
                    self.y2.as_str(),
                ]),
                n,
            )),
            _ => Err(errors),
        }
    }
}
