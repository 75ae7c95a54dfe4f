//! Group model representing a club sub-group

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ClubGroupError;

/// Base URL used to build the placeholder photo of a group created without one
pub const PLACEHOLDER_PHOTO_BASE: &str = "https://via.placeholder.com/150?text=";

/// Opaque group identifier assigned by the store
pub type GroupId = String;

/// Role a user holds inside a group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Helps running the group
    Collaborator,
    /// Manages the group
    Manager,
    /// Regular member
    #[default]
    Member,
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collaborator => write!(f, "collaborator"),
            Self::Manager => write!(f, "manager"),
            Self::Member => write!(f, "member"),
        }
    }
}

/// Group categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Academic groups
    #[serde(rename = "Học thuật")]
    Academic,
    /// Volunteering groups
    #[serde(rename = "Tình nguyện")]
    Volunteer,
    /// Campaign and movement groups
    #[serde(rename = "Phong trào")]
    Movement,
    /// Performing arts groups
    #[serde(rename = "Văn nghệ")]
    Arts,
    /// The main group of a club
    Main,
    /// Uncategorized
    #[default]
    Default,
}

impl Category {
    /// Label used when the category is persisted
    pub fn label(&self) -> &'static str {
        match self {
            Self::Academic => "Học thuật",
            Self::Volunteer => "Tình nguyện",
            Self::Movement => "Phong trào",
            Self::Arts => "Văn nghệ",
            Self::Main => "Main",
            Self::Default => "Default",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = ClubGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Học thuật" => Ok(Self::Academic),
            "Tình nguyện" => Ok(Self::Volunteer),
            "Phong trào" => Ok(Self::Movement),
            "Văn nghệ" => Ok(Self::Arts),
            "Main" => Ok(Self::Main),
            "Default" => Ok(Self::Default),
            other => Err(ClubGroupError::Validation(format!(
                "'{}' is not a valid group category",
                other
            ))),
        }
    }
}

/// A user's membership entry in a group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    /// Reference to the user
    pub user: String,

    /// Role of the user inside the group
    #[serde(default)]
    pub role: MemberRole,
}

impl Member {
    /// Create a membership with the default `member` role
    pub fn new<S: Into<String>>(user: S) -> Self {
        Self {
            user: user.into(),
            role: MemberRole::Member,
        }
    }

    /// Create a membership with an explicit role
    pub fn with_role<S: Into<String>>(user: S, role: MemberRole) -> Self {
        Self {
            user: user.into(),
            role,
        }
    }
}

/// A persisted group as returned by reads.
///
/// `search_token` and `members` are hidden by the default read projection and
/// come back as `None` unless explicitly requested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    /// Store-assigned identifier
    pub id: GroupId,

    /// Display name
    pub name: String,

    /// Normalized form of `name`, derived on every name write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_token: Option<String>,

    /// Free-text description
    pub description: String,

    /// Photo URL
    pub photo: String,

    /// Ordered memberships
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Member>>,

    /// Category
    pub category: Category,

    /// Whether this is the club's main group
    pub is_main: bool,

    /// Reference to the owning club
    pub club: String,

    /// When the group was created
    pub created_at: DateTime<Utc>,
}

/// Input for the create path.
///
/// There is deliberately no way to set the search token here; it is derived
/// from `name` by the lifecycle pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) photo: Option<String>,
    pub(crate) members: Vec<Member>,
    pub(crate) category: Category,
    pub(crate) is_main: bool,
    pub(crate) club: String,
}

impl NewGroup {
    /// Create a builder for a group belonging to `club`
    pub fn builder<N, D, C>(name: N, description: D, club: C) -> NewGroupBuilder
    where
        N: Into<String>,
        D: Into<String>,
        C: Into<String>,
    {
        NewGroupBuilder::new(name, description, club)
    }

    /// Name as supplied, trimmed
    pub fn name(&self) -> &str {
        self.name.trim()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn club(&self) -> &str {
        &self.club
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_main(&self) -> bool {
        self.is_main
    }

    /// Photo to persist: the supplied one, or a placeholder built from the
    /// first character of the name
    pub fn photo_or_placeholder(&self) -> String {
        match &self.photo {
            Some(photo) => photo.clone(),
            None => placeholder_photo(self.name()),
        }
    }

    /// Check the required fields
    pub fn validate(&self) -> Result<(), ClubGroupError> {
        if self.name().is_empty() {
            return Err(ClubGroupError::Validation(
                "A group must have a name".to_string(),
            ));
        }
        if self.description.is_empty() {
            return Err(ClubGroupError::Validation(
                "A group must have a description".to_string(),
            ));
        }
        if self.club.trim().is_empty() {
            return Err(ClubGroupError::Validation(
                "A group must belong to a club".to_string(),
            ));
        }
        if self.members.iter().any(|m| m.user.trim().is_empty()) {
            return Err(ClubGroupError::Validation(
                "Group members must reference a user".to_string(),
            ));
        }
        Ok(())
    }
}

/// Build the placeholder photo URL for a name
pub fn placeholder_photo(name: &str) -> String {
    let initial = name.chars().next().map(String::from).unwrap_or_default();
    format!("{}{}", PLACEHOLDER_PHOTO_BASE, initial)
}

/// Builder for [`NewGroup`]
#[derive(Debug, Clone)]
pub struct NewGroupBuilder {
    group: NewGroup,
}

impl NewGroupBuilder {
    /// Start a group with its required fields
    pub fn new<N, D, C>(name: N, description: D, club: C) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        C: Into<String>,
    {
        Self {
            group: NewGroup {
                name: name.into(),
                description: description.into(),
                photo: None,
                members: Vec::new(),
                category: Category::Default,
                is_main: false,
                club: club.into(),
            },
        }
    }

    /// Set an explicit photo URL
    pub fn photo<S: Into<String>>(mut self, photo: S) -> Self {
        self.group.photo = Some(photo.into());
        self
    }

    /// Append a member with the default role
    pub fn member<S: Into<String>>(mut self, user: S) -> Self {
        self.group.members.push(Member::new(user));
        self
    }

    /// Append a member with an explicit role
    pub fn member_with_role<S: Into<String>>(mut self, user: S, role: MemberRole) -> Self {
        self.group.members.push(Member::with_role(user, role));
        self
    }

    /// Replace the member list
    pub fn members(mut self, members: Vec<Member>) -> Self {
        self.group.members = members;
        self
    }

    /// Set the category
    pub fn category(mut self, category: Category) -> Self {
        self.group.category = category;
        self
    }

    /// Mark this as the club's main group
    pub fn main(mut self, is_main: bool) -> Self {
        self.group.is_main = is_main;
        self
    }

    /// Build the final NewGroup instance
    pub fn build(self) -> NewGroup {
        self.group
    }
}

/// Partial update of a group.
///
/// Only fields that are `Some` are written. `id`, `created_at` and the search
/// token are not part of the patch surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Member>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_main: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<String>,
}

impl GroupPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description
    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the photo URL
    pub fn photo<S: Into<String>>(mut self, photo: S) -> Self {
        self.photo = Some(photo.into());
        self
    }

    /// Replace the member list
    pub fn members(mut self, members: Vec<Member>) -> Self {
        self.members = Some(members);
        self
    }

    /// Set the category
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the main-group flag
    pub fn is_main(mut self, is_main: bool) -> Self {
        self.is_main = Some(is_main);
        self
    }

    /// Move the group to another club
    pub fn club<S: Into<String>>(mut self, club: S) -> Self {
        self.club = Some(club.into());
        self
    }

    /// The patched name, trimmed, when the patch carries one
    pub fn patched_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim)
    }

    /// Whether the patch writes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.photo.is_none()
            && self.members.is_none()
            && self.category.is_none()
            && self.is_main.is_none()
            && self.club.is_none()
    }

    /// Copy of the patch with the name trimmed, as it will be persisted
    pub(crate) fn normalized(&self) -> Self {
        let mut patch = self.clone();
        if let Some(name) = patch.name.as_mut() {
            *name = name.trim().to_string();
        }
        patch
    }
}
