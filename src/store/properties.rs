use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::IdGenerator;
use crate::models::{Property, PropertyDraft};

/// All listings, in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PropertyStore {
    properties: Vec<Property>,
}

impl From<Vec<Property>> for PropertyStore {
    fn from(properties: Vec<Property>) -> Self {
        Self { properties }
    }
}

impl PropertyStore {
    /// Store a new listing under a fresh id
    pub fn add(&mut self, draft: PropertyDraft, ids: &IdGenerator) -> Property {
        let property = Property::from_draft(ids.next_id(), draft);
        debug!("Adding property {} ({})", property.id, property.title);
        self.properties.push(property.clone());
        property
    }

    /// Replace the listing with the same id. Returns `false` if there is none.
    pub fn update(&mut self, property: Property) -> bool {
        match self.properties.iter_mut().find(|p| p.id == property.id) {
            Some(slot) => {
                debug!("Updating property {}", property.id);
                *slot = property;
                true
            }
            None => {
                warn!("Ignoring update for unknown property {}", property.id);
                false
            }
        }
    }

    /// Delete the listing with `id`. Returns `false` if there is none.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.properties.len();
        self.properties.retain(|p| p.id != id);

        let removed = self.properties.len() != before;
        if removed {
            debug!("Removed property {}", id);
        } else {
            warn!("Ignoring delete for unknown property {}", id);
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn list(&self) -> &[Property] {
        &self.properties
    }

    pub fn list_by_owner(&self, owner_email: &str) -> Vec<&Property> {
        self.properties
            .iter()
            .filter(|p| p.owner_email == owner_email)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
