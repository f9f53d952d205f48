use serde::{Deserialize, Serialize};

use crate::models::{Furnishing, Property, PropertyType};

/// Search filters for recommendations. `None` means "Any".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterCriteria {
    /// Minimum monthly rent
    pub min_rent: Option<f64>,
    /// Maximum monthly rent
    pub max_rent: Option<f64>,
    /// Case-insensitive substring of the city
    pub city: Option<String>,
    pub furnishing: Option<Furnishing>,
    pub property_type: Option<PropertyType>,
    pub min_rating: Option<f64>,
}

impl FilterCriteria {
    pub fn matches(&self, property: &Property) -> bool {
        if self.min_rent.is_some_and(|min| property.rent < min) {
            return false;
        }
        if self.max_rent.is_some_and(|max| property.rent > max) {
            return false;
        }
        // matched as typed; only an empty string means "any city"
        if let Some(city) = self.city.as_deref().filter(|c| !c.is_empty()) {
            if !property.city.to_lowercase().contains(&city.to_lowercase()) {
                return false;
            }
        }
        if self
            .furnishing
            .as_ref()
            .is_some_and(|f| *f != property.furnished_type)
        {
            return false;
        }
        if self
            .property_type
            .as_ref()
            .is_some_and(|t| *t != property.property_type)
        {
            return false;
        }
        if self.min_rating.is_some_and(|min| property.rating < min) {
            return false;
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
