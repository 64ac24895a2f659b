//! User profile repository.
//!
//! Profiles are keyed by the identity provider's user id.

use std::ops::Deref;
use std::sync::Arc;

use domain::models::{Record, UserProfile};

use super::base::BaseRepository;
use crate::error::RepositoryError;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct UserProfileRepository {
    base: BaseRepository<UserProfile>,
}

impl UserProfileRepository {
    /// Creates a new UserProfileRepository over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    /// Store the profile at `user_id`, creating it on first sight and
    /// replacing it afterwards. Optional fields left out of `profile` are
    /// cleared. Returns the record and whether it was created.
    pub async fn save(
        &self,
        user_id: &str,
        profile: &UserProfile,
        actor: Option<&str>,
    ) -> Result<(Record<UserProfile>, bool), RepositoryError> {
        if self.base.exists(user_id).await? {
            let record = self
                .base
                .replace_fields(user_id, profile, None, actor)
                .await?;
            Ok((record, false))
        } else {
            let record = self.base.create_with_id(user_id, profile, actor).await?;
            Ok((record, true))
        }
    }
}

impl Deref for UserProfileRepository {
    type Target = BaseRepository<UserProfile>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
