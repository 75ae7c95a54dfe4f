//! Store-facing document types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Category, Group, GroupId, GroupPatch, Member};
use crate::storage::errors::StorageError;

/// A fully derived group document ready to be persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupDocument {
    pub name: String,
    pub search_token: String,
    pub description: String,
    pub photo: String,
    pub members: Vec<Member>,
    pub category: Category,
    pub is_main: bool,
    pub club: String,
    pub created_at: DateTime<Utc>,
}

impl GroupDocument {
    /// Attach the store-assigned ID
    pub fn into_group(self, id: GroupId) -> Group {
        Group {
            id,
            name: self.name,
            search_token: Some(self.search_token),
            description: self.description,
            photo: self.photo,
            members: Some(self.members),
            category: self.category,
            is_main: self.is_main,
            club: self.club,
            created_at: self.created_at,
        }
    }
}

/// A partial write handed to the store.
///
/// Either the caller's patch, or the targeted search token write issued by the
/// lifecycle pipeline. Only this crate can build an update carrying a token.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreUpdate {
    patch: GroupPatch,
    search_token: Option<String>,
}

impl StoreUpdate {
    pub(crate) fn from_patch(patch: GroupPatch) -> Self {
        Self {
            patch,
            search_token: None,
        }
    }

    pub(crate) fn search_token_only(token: String) -> Self {
        Self {
            patch: GroupPatch::default(),
            search_token: Some(token),
        }
    }

    /// Caller-supplied fields
    pub fn patch(&self) -> &GroupPatch {
        &self.patch
    }

    /// Derived search token to write, if any
    pub fn search_token(&self) -> Option<&str> {
        self.search_token.as_deref()
    }

    /// Whether the update writes nothing
    pub fn is_empty(&self) -> bool {
        self.patch.is_empty() && self.search_token.is_none()
    }

    /// Object of the fields to merge into matching documents
    pub fn to_merge_value(&self) -> Result<serde_json::Value, StorageError> {
        let mut value = serde_json::to_value(&self.patch)?;
        if let (Some(token), serde_json::Value::Object(map)) = (&self.search_token, &mut value) {
            map.insert(
                "search_token".to_string(),
                serde_json::Value::String(token.clone()),
            );
        }
        Ok(value)
    }

    /// Apply the update to an in-memory group
    pub fn apply_to(&self, group: &mut Group) {
        let patch = &self.patch;
        if let Some(name) = &patch.name {
            group.name = name.clone();
        }
        if let Some(description) = &patch.description {
            group.description = description.clone();
        }
        if let Some(photo) = &patch.photo {
            group.photo = photo.clone();
        }
        if let Some(members) = &patch.members {
            group.members = Some(members.clone());
        }
        if let Some(category) = patch.category {
            group.category = category;
        }
        if let Some(is_main) = patch.is_main {
            group.is_main = is_main;
        }
        if let Some(club) = &patch.club {
            group.club = club.clone();
        }
        if let Some(token) = &self.search_token {
            group.search_token = Some(token.clone());
        }
    }
}

/// Result of a partial update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// Number of documents matched by the filter
    pub matched: u64,

    /// IDs of the matched documents
    pub ids: Vec<GroupId>,
}

impl UpdateResult {
    pub fn new(ids: Vec<GroupId>) -> Self {
        Self {
            matched: ids.len() as u64,
            ids,
        }
    }
}
