pub mod forms;
pub mod seed;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub use forms::PropertyForm;
pub use seed::seed_properties;

/// Role picked at login, fixed for the lifetime of the session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Tenant,
    Owner,
}

/// The logged-in user. Lives in the session record only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl User {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        let email = email.into();
        let name = display_name(&email);
        Self { email, role, name }
    }
}

/// Local part of an email address
pub fn display_name(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

/// Session record: the current user, or `None` when logged out
pub type Session = Option<User>;

/// Kind of listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    Apartment,
    IndividualHouse,
    TwoBhk,
    ThreeBhk,
    Studio,
    /// Anything written by an older or newer client
    Other(String),
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::Apartment,
        PropertyType::IndividualHouse,
        PropertyType::TwoBhk,
        PropertyType::ThreeBhk,
        PropertyType::Studio,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            PropertyType::Apartment => "Apartment",
            PropertyType::IndividualHouse => "Individual House",
            PropertyType::TwoBhk => "2BHK",
            PropertyType::ThreeBhk => "3BHK",
            PropertyType::Studio => "Studio",
            PropertyType::Other(raw) => raw,
        }
    }
}

impl From<String> for PropertyType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Apartment" => PropertyType::Apartment,
            "Individual House" => PropertyType::IndividualHouse,
            "2BHK" => PropertyType::TwoBhk,
            "3BHK" => PropertyType::ThreeBhk,
            "Studio" => PropertyType::Studio,
            _ => PropertyType::Other(raw),
        }
    }
}

impl From<PropertyType> for String {
    fn from(value: PropertyType) -> Self {
        match value {
            PropertyType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Furnishing level of a listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Furnishing {
    Fully,
    Semi,
    Unfurnished,
    Other(String),
}

impl Furnishing {
    pub const ALL: [Furnishing; 3] = [Furnishing::Fully, Furnishing::Semi, Furnishing::Unfurnished];

    pub fn as_str(&self) -> &str {
        match self {
            Furnishing::Fully => "Fully Furnished",
            Furnishing::Semi => "Semi Furnished",
            Furnishing::Unfurnished => "Unfurnished",
            Furnishing::Other(raw) => raw,
        }
    }
}

impl From<String> for Furnishing {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Fully Furnished" => Furnishing::Fully,
            "Semi Furnished" => Furnishing::Semi,
            "Unfurnished" => Furnishing::Unfurnished,
            _ => Furnishing::Other(raw),
        }
    }
}

impl From<Furnishing> for String {
    fn from(value: Furnishing) -> Self {
        match value {
            Furnishing::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Furnishing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core rental listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,
    pub city: String,
    pub property_type: PropertyType,
    pub furnished_type: Furnishing,
    pub rating: f64,
    pub rent: f64,
    pub image_url: String,
    #[serde(
        default,
        deserialize_with = "non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_email: String,
}

/// A listing before the store has given it an id
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub city: String,
    pub property_type: PropertyType,
    pub furnished_type: Furnishing,
    pub rating: f64,
    pub rent: f64,
    pub image_url: String,
    pub video_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_email: String,
}

impl Property {
    pub fn from_draft(id: String, draft: PropertyDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            city: draft.city,
            property_type: draft.property_type,
            furnished_type: draft.furnished_type,
            rating: draft.rating,
            rent: draft.rent,
            image_url: draft.image_url,
            video_url: draft.video_url,
            latitude: draft.latitude,
            longitude: draft.longitude,
            owner_email: draft.owner_email,
        }
    }

    pub fn video_source(&self) -> Option<VideoSource> {
        self.video_url.as_deref().map(VideoSource::classify)
    }
}

/// Where a listing's walkthrough video lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    YouTube { embed_url: String },
    /// `blob:` reference to a local upload. Only valid in the context that created it.
    LocalBlob(String),
    Direct(String),
}

impl VideoSource {
    pub fn classify(url: &str) -> Self {
        if url.starts_with("blob:") {
            return VideoSource::LocalBlob(url.to_string());
        }

        if let Some(video_id) = youtube_id(url) {
            return VideoSource::YouTube {
                embed_url: format!("https://www.youtube.com/embed/{}", video_id),
            };
        }

        VideoSource::Direct(url.to_string())
    }

    pub fn is_shareable(&self) -> bool {
        !matches!(self, VideoSource::LocalBlob(_))
    }
}

fn youtube_id(url: &str) -> Option<&str> {
    let rest = if let Some(pos) = url.find("youtube.com/watch?") {
        let query = &url[pos + "youtube.com/watch?".len()..];
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("v="))?
    } else if let Some(pos) = url.find("youtu.be/") {
        &url[pos + "youtu.be/".len()..]
    } else {
        return None;
    };

    let id = rest.split(['?', '&', '#', '/']).next().unwrap_or_default();
    (!id.is_empty()).then_some(id)
}

/// Alert sent to an owner when a tenant likes one of their listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub owner_email: String,
    pub message: String,
    pub date: DateTime<Utc>,
    pub read: bool,
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
