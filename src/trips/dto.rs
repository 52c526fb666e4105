use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TripPayload {
    pub title: String,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityPayload {
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Coordinates must come as a pair and stay within valid ranges.
pub fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), String> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("latitude {lat} out of range"));
            }
            if !(-180.0..=180.0).contains(&lon) {
                return Err(format!("longitude {lon} out of range"));
            }
            Ok(())
        }
        _ => Err("latitude and longitude must be set together".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_absent_or_valid_coordinates() {
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(47.3769), Some(8.5417)).is_ok());
        assert!(validate_coordinates(Some(-90.0), Some(180.0)).is_ok());
    }

    #[test]
    fn rejects_partial_pair() {
        assert!(validate_coordinates(Some(47.0), None).is_err());
        assert!(validate_coordinates(None, Some(8.0)).is_err());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(validate_coordinates(Some(91.0), Some(8.0)).is_err());
        assert!(validate_coordinates(Some(47.0), Some(181.0)).is_err());
    }
}
