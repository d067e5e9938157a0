//! In-process stores used by tests and local runs without Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    db::StoreError,
    posts::{
        repo::PostStore,
        repo_types::{NewPost, Post},
    },
    profiles::{
        repo::{EntryRemoval, ProfileStore},
        repo_types::{EntryKind, Profile, ProfileFields, ProfileWithUser, SubEntry, UserSummary},
    },
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: Vec<Profile>,
    posts: Vec<Post>,
}

impl Tables {
    fn with_user(&self, profile: &Profile) -> Option<ProfileWithUser> {
        let user = self.users.get(&profile.user_id)?;
        Some(ProfileWithUser {
            profile: profile.clone(),
            user: UserSummary {
                id: user.id,
                name: user.name.clone(),
            },
        })
    }

    fn profile_mut(&mut self, user_id: Uuid) -> Option<&mut Profile> {
        self.profiles.iter_mut().find(|p| p.user_id == user_id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_name_and_email(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t
            .users
            .values()
            .find(|u| u.name == name && u.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.users.remove(&id).is_some())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<ProfileWithUser>, StoreError> {
        let t = self.tables.read().await;
        Ok(t
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .and_then(|p| t.with_user(p)))
    }

    async fn list(&self) -> Result<Vec<ProfileWithUser>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.profiles.iter().filter_map(|p| t.with_user(p)).collect())
    }

    async fn upsert(&self, user_id: Uuid, fields: &ProfileFields) -> Result<Profile, StoreError> {
        let mut t = self.tables.write().await;
        if let Some(profile) = t.profile_mut(user_id) {
            profile.apply(fields);
            return Ok(profile.clone());
        }
        let profile = Profile::create(user_id, fields);
        t.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn push_entry(
        &self,
        user_id: Uuid,
        entry: SubEntry,
    ) -> Result<Option<Profile>, StoreError> {
        let mut t = self.tables.write().await;
        Ok(t.profile_mut(user_id).map(|p| {
            p.prepend(entry);
            p.clone()
        }))
    }

    async fn remove_entry(
        &self,
        user_id: Uuid,
        kind: EntryKind,
        entry_id: Uuid,
    ) -> Result<EntryRemoval, StoreError> {
        let mut t = self.tables.write().await;
        let Some(profile) = t.profile_mut(user_id) else {
            return Ok(EntryRemoval::ProfileMissing);
        };
        if profile.remove_entry(kind, entry_id) {
            Ok(EntryRemoval::Removed(profile.clone()))
        } else {
            Ok(EntryRemoval::EntryMissing)
        }
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        let before = t.profiles.len();
        t.profiles.retain(|p| p.user_id != user_id);
        Ok(t.profiles.len() != before)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let post = post.into_post(Uuid::new_v4());
        self.tables.write().await.posts.push(post.clone());
        Ok(post)
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let mut posts = self.tables.read().await.posts.clone();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_owned(&self, user_id: Uuid, id: Uuid) -> Result<Option<Post>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(pos) = t.posts.iter().position(|p| p.id == id && p.user == user_id) else {
            return Ok(None);
        };
        Ok(Some(t.posts.remove(pos)))
    }
}
