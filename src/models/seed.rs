use super::{Furnishing, Property, PropertyType};

/// Listings used on first run, before anything has been persisted
pub fn seed_properties() -> Vec<Property> {
    vec![
        Property {
            id: "1".to_string(),
            title: "Modern 2BHK in Downtown".to_string(),
            description: "A lovely apartment with city views, close to metro station.".to_string(),
            city: "New York".to_string(),
            property_type: PropertyType::TwoBhk,
            furnished_type: Furnishing::Fully,
            rating: 4.5,
            rent: 2500.0,
            image_url: "https://picsum.photos/800/600?random=1".to_string(),
            video_url: Some("https://www.youtube.com/watch?v=LXb3EKWsInQ".to_string()),
            latitude: 40.7128,
            longitude: -74.0060,
            owner_email: "owner@example.com".to_string(),
        },
        Property {
            id: "2".to_string(),
            title: "Cozy Studio near Park".to_string(),
            description: "Perfect for singles, quiet neighborhood.".to_string(),
            city: "San Francisco".to_string(),
            property_type: PropertyType::Studio,
            furnished_type: Furnishing::Semi,
            rating: 4.0,
            rent: 1800.0,
            image_url: "https://picsum.photos/800/600?random=2".to_string(),
            video_url: Some("https://www.w3schools.com/html/mov_bbb.mp4".to_string()),
            latitude: 37.7749,
            longitude: -122.4194,
            owner_email: "owner@example.com".to_string(),
        },
        Property {
            id: "3".to_string(),
            title: "Luxury 3BHK Villa".to_string(),
            description: "Spacious villa with private garden and pool access.".to_string(),
            city: "Los Angeles".to_string(),
            property_type: PropertyType::ThreeBhk,
            furnished_type: Furnishing::Fully,
            rating: 4.8,
            rent: 4500.0,
            image_url: "https://picsum.photos/800/600?random=3".to_string(),
            video_url: None,
            latitude: 34.0522,
            longitude: -118.2437,
            owner_email: "landlord@test.com".to_string(),
        },
        Property {
            id: "4".to_string(),
            title: "Affordable Apartment".to_string(),
            description: "Great value for money, near university.".to_string(),
            city: "Chicago".to_string(),
            property_type: PropertyType::Apartment,
            furnished_type: Furnishing::Unfurnished,
            rating: 3.5,
            rent: 1200.0,
            image_url: "https://picsum.photos/800/600?random=4".to_string(),
            video_url: None,
            latitude: 41.8781,
            longitude: -87.6298,
            owner_email: "owner@example.com".to_string(),
        },
    ]
}
