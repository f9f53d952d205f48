//! Application state owner and sync layer.
//!
//! [`RentalApp`] keeps the shared blob and the session apart: every change to
//! listings, likes or notifications rewrites the shared key, every login or
//! logout rewrites the session key, and changes other contexts make to the
//! shared key replace the local copy wholesale (last writer wins). The
//! session is never touched by that path.

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::auth::LoginForm;
use crate::config::Config;
use crate::error::AppError;
use crate::models::{Notification, Property, PropertyDraft, Role, Session, User};
use crate::recommend::{self, FilterCriteria};
use crate::storage::{ExternalChanges, StorageEvent, StorageProvider};
use crate::store::{IdGenerator, SharedState, Toggle};

/// Handle returned by [`RentalApp::on_external_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&SharedState) + Send>;

pub struct RentalApp<S: StorageProvider> {
    storage: S,
    config: Config,
    state: SharedState,
    session: Session,
    ids: IdGenerator,
    changes: ExternalChanges,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl<S: StorageProvider> RentalApp<S> {
    /// Load shared data and session from `storage`, seeding on first run
    pub async fn open(storage: S, config: Config) -> Result<Self> {
        info!(
            "Opening rental data from {} storage",
            storage.backend_name()
        );

        // subscribe before reading so nothing written in between is lost
        let changes = storage.subscribe();

        let (state, needs_seed_write) = match storage.read(&config.shared_key).await? {
            Some(raw) => match SharedState::from_json(&raw) {
                Ok(state) => {
                    info!(
                        "Loaded {} properties from {}",
                        state.properties.len(),
                        config.shared_key
                    );
                    (state, false)
                }
                Err(e) => {
                    warn!("Shared data is malformed ({}), falling back to seed data", e);
                    (SharedState::seeded(), true)
                }
            },
            None => {
                info!("No shared data yet, starting from seed data");
                (SharedState::seeded(), true)
            }
        };

        let session = match storage.read(&config.session_key).await? {
            Some(raw) => serde_json::from_str::<Session>(&raw).unwrap_or_else(|e| {
                warn!("Session record is malformed ({}), starting logged out", e);
                None
            }),
            None => None,
        };
        if let Some(user) = &session {
            info!("Restored session for {}", user.email);
        }

        let ids = IdGenerator::new();
        ids.observe(&state);

        let app = Self {
            storage,
            config,
            state,
            session,
            ids,
            changes,
            listeners: Vec::new(),
            next_listener: 0,
        };

        if needs_seed_write {
            app.persist_shared().await;
        }

        Ok(app)
    }

    // --- Session ---

    pub async fn login(&mut self, email: &str, role: Role) -> User {
        let user = User::new(email.trim(), role);
        info!("Logged in {} as {:?}", user.email, user.role);
        self.session = Some(user.clone());
        self.persist_session().await;
        user
    }

    /// Validate a sign-in form, then log in
    pub async fn submit_login(&mut self, form: &LoginForm) -> Result<User, AppError> {
        form.validate()?;
        Ok(self.login(&form.email, form.role).await)
    }

    pub async fn logout(&mut self) {
        if let Some(user) = self.session.take() {
            info!("Logged out {}", user.email);
        }
        self.persist_session().await;
    }

    pub fn session(&self) -> Option<&User> {
        self.session.as_ref()
    }

    // --- Listings ---

    pub async fn add_property(&mut self, draft: PropertyDraft) -> Property {
        let property = self.state.properties.add(draft, &self.ids);
        info!("Added property {} for {}", property.id, property.owner_email);
        self.persist_shared().await;
        property
    }

    /// Replace a listing in place. Unknown ids are logged and ignored.
    pub async fn update_property(&mut self, property: Property) -> bool {
        let updated = self.state.properties.update(property);
        if updated {
            self.persist_shared().await;
        }
        updated
    }

    /// Delete a listing. Likes pointing at it are left alone.
    pub async fn delete_property(&mut self, id: &str) -> bool {
        let removed = self.state.properties.remove(id);
        if removed {
            self.persist_shared().await;
        }
        removed
    }

    // --- Likes and notifications ---

    /// Like or unlike a listing for the current tenant, notifying the owner on a new like
    pub async fn toggle_like(&mut self, property_id: &str) -> Result<Toggle, AppError> {
        let user = self.session.as_ref().ok_or(AppError::NotLoggedIn)?;
        if user.role != Role::Tenant {
            warn!("{} is not a tenant, ignoring like of {}", user.email, property_id);
            return Err(AppError::NotATenant);
        }
        let user_email = user.email.clone();

        let toggle = self.state.favorites.toggle(&user_email, property_id);

        if toggle.liked {
            let target = self
                .state
                .properties
                .get(property_id)
                .map(|p| (p.owner_email.clone(), p.title.clone()));

            match target {
                Some((owner_email, title)) => {
                    let message =
                        format!("Tenant {} liked your property \"{}\"", user_email, title);
                    self.state
                        .notifications
                        .enqueue(&owner_email, message, Utc::now(), &self.ids);
                }
                None => warn!(
                    "Property {} not found, no owner to notify about the like",
                    property_id
                ),
            }
        }

        self.persist_shared().await;
        Ok(toggle)
    }

    /// Mark one of the current owner's notifications as read
    pub async fn mark_notification_read(&mut self, notification_id: &str) -> Result<bool, AppError> {
        let owner_email = self
            .session
            .as_ref()
            .map(|u| u.email.clone())
            .ok_or(AppError::NotLoggedIn)?;

        let marked = self.state.notifications.mark_read(&owner_email, notification_id);
        if marked {
            self.persist_shared().await;
        } else {
            warn!("Ignoring mark-read for unknown notification {}", notification_id);
        }
        Ok(marked)
    }

    // --- Views ---

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn properties(&self) -> &[Property] {
        self.state.properties.list()
    }

    /// Listings owned by the logged-in user
    pub fn my_properties(&self) -> Vec<&Property> {
        match &self.session {
            Some(user) => self.state.properties.list_by_owner(&user.email),
            None => Vec::new(),
        }
    }

    pub fn liked_ids(&self) -> &[String] {
        match &self.session {
            Some(user) => self.state.favorites.list_for(&user.email),
            None => &[],
        }
    }

    pub fn liked_properties(&self) -> Vec<&Property> {
        match &self.session {
            Some(user) => self
                .state
                .favorites
                .liked_properties(&user.email, &self.state.properties),
            None => Vec::new(),
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        match &self.session {
            Some(user) => self.state.notifications.list_for(&user.email),
            None => &[],
        }
    }

    pub fn unread_notifications(&self) -> usize {
        self.session
            .as_ref()
            .map(|u| self.state.notifications.unread_count(&u.email))
            .unwrap_or(0)
    }

    /// Ranked, filtered listings for the logged-in user
    pub fn recommend(&self, criteria: &FilterCriteria) -> Vec<&Property> {
        let liked = self.liked_properties();
        recommend::recommend(self.state.properties.list(), &liked, criteria)
    }

    // --- External changes ---

    /// Call `handler` with the new shared state after every external change
    pub fn on_external_change<F>(&mut self, handler: F) -> ListenerId
    where
        F: FnMut(&SharedState) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(handler)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Replace the shared state with the value another context wrote.
    ///
    /// Returns `false` for other keys, removals and unparseable values.
    pub fn apply_external_change(&mut self, event: &StorageEvent) -> bool {
        if event.key != self.config.shared_key {
            debug!("Ignoring external change to {}", event.key);
            return false;
        }

        let Some(raw) = event.new_value.as_deref() else {
            debug!("Shared data removed externally, keeping local copy");
            return false;
        };

        match SharedState::from_json(raw) {
            Ok(state) => {
                info!(
                    "Shared data changed externally ({} properties)",
                    state.properties.len()
                );
                self.ids.observe(&state);
                self.state = state;
                for (_, listener) in self.listeners.iter_mut() {
                    listener(&self.state);
                }
                true
            }
            Err(e) => {
                warn!("Ignoring malformed external shared data: {}", e);
                false
            }
        }
    }

    /// Wait for the next change from another context and apply it.
    ///
    /// `None` once the storage stops delivering events.
    pub async fn sync_next(&mut self) -> Option<bool> {
        let event = self.changes.recv().await?;
        Some(self.apply_external_change(&event))
    }

    /// Apply every external change that has already arrived
    pub fn sync_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.changes.try_recv() {
            if self.apply_external_change(&event) {
                applied += 1;
            }
        }
        applied
    }

    // --- Persistence ---

    async fn persist_shared(&self) {
        let json = match self.state.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize shared data: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.write(&self.config.shared_key, &json).await {
            error!("Failed to persist shared data: {:#}", e);
        }
    }

    async fn persist_session(&self) {
        let json = match serde_json::to_string(&self.session) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize session: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.write(&self.config.session_key, &json).await {
            error!("Failed to persist session: {:#}", e);
        }
    }
}
