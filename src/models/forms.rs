use super::{Furnishing, Property, PropertyDraft, PropertyType};
use crate::error::ValidationError;

const DEFAULT_IMAGE_URL: &str = "https://picsum.photos/800/600";
const DEFAULT_RATING: &str = "4.0";

/// Raw listing input as typed by an owner. Numbers stay strings until submit.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyForm {
    pub title: String,
    pub description: String,
    pub city: String,
    pub rating: String,
    pub furnished_type: Furnishing,
    pub property_type: PropertyType,
    pub image_url: String,
    pub rent: String,
    pub video_url: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for PropertyForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            city: String::new(),
            rating: DEFAULT_RATING.to_string(),
            furnished_type: Furnishing::Fully,
            property_type: PropertyType::TwoBhk,
            image_url: DEFAULT_IMAGE_URL.to_string(),
            rent: String::new(),
            video_url: String::new(),
            latitude: String::new(),
            longitude: String::new(),
        }
    }
}

impl PropertyForm {
    /// Pre-fill the form for editing an existing listing
    pub fn from_property(property: &Property) -> Self {
        Self {
            title: property.title.clone(),
            description: property.description.clone(),
            city: property.city.clone(),
            rating: property.rating.to_string(),
            furnished_type: property.furnished_type.clone(),
            property_type: property.property_type.clone(),
            image_url: property.image_url.clone(),
            rent: property.rent.to_string(),
            video_url: property.video_url.clone().unwrap_or_default(),
            latitude: property.latitude.to_string(),
            longitude: property.longitude.to_string(),
        }
    }

    /// Presence-check and parse the form into a draft owned by `owner_email`
    pub fn into_draft(self, owner_email: &str) -> Result<PropertyDraft, ValidationError> {
        let title = required("title", self.title)?;
        let city = required("city", self.city)?;
        let rent = number("rent", &required("rent", self.rent)?)?;
        let latitude = number("latitude", &required("latitude", self.latitude)?)?;
        let longitude = number("longitude", &required("longitude", self.longitude)?)?;

        let rating = match self.rating.trim() {
            "" => number("rating", DEFAULT_RATING)?,
            raw => number("rating", raw)?,
        };

        let image_url = match self.image_url.trim() {
            "" => DEFAULT_IMAGE_URL.to_string(),
            url => url.to_string(),
        };

        let video_url = Some(self.video_url.trim().to_string()).filter(|url| !url.is_empty());

        Ok(PropertyDraft {
            title,
            description: self.description,
            city,
            property_type: self.property_type,
            furnished_type: self.furnished_type,
            rating,
            rent,
            image_url,
            video_url,
            latitude,
            longitude,
            owner_email: owner_email.to_string(),
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn number(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}
