//! Points of interest, as read from the location catalog.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A real-world location a node is bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterest {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PointOfInterest {
    /// Case-insensitive tag membership.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|own| own.eq_ignore_ascii_case(tag.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_tag_ignores_case_and_padding() {
        let poi = PointOfInterest {
            id: Uuid::new_v4(),
            name: "Fountain".to_owned(),
            description: String::new(),
            image_url: String::new(),
            lat: 0.0,
            lng: 0.0,
            tags: vec!["Park".to_owned()],
        };

        assert!(poi.has_tag(" park "));
        assert!(!poi.has_tag("museum"));
    }
}
