//! Filter and projection types for group queries

use serde::{Deserialize, Serialize};

use crate::models::{Category, Group, GroupId};

/// Filter for group queries.
///
/// All set criteria must hold. An empty filter matches every group.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GroupFilter {
    /// Filter by group IDs
    pub ids: Option<Vec<GroupId>>,

    /// Filter by owning club
    pub club: Option<String>,

    /// Filter by exact (trimmed) name
    pub name: Option<String>,

    /// Filter by category
    pub category: Option<Category>,

    /// Filter by main-group flag
    pub is_main: Option<bool>,

    /// Full-text query over the search token; every term must be a token.
    /// Expected to be normalized already.
    pub text: Option<String>,
}

impl GroupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a single group by ID
    pub fn by_id<S: Into<GroupId>>(id: S) -> Self {
        Self {
            ids: Some(vec![id.into()]),
            ..Self::default()
        }
    }

    /// Match any of the given IDs
    pub fn by_ids(ids: Vec<GroupId>) -> Self {
        Self {
            ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn club<S: Into<String>>(mut self, club: S) -> Self {
        self.club = Some(club.into());
        self
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn is_main(mut self, is_main: bool) -> Self {
        self.is_main = Some(is_main);
        self
    }

    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Check whether a fully projected group satisfies the filter
    pub fn matches(&self, group: &Group) -> bool {
        if let Some(ids) = &self.ids
            && !ids.iter().any(|id| id == &group.id)
        {
            return false;
        }
        if let Some(club) = &self.club
            && club != &group.club
        {
            return false;
        }
        if let Some(name) = &self.name
            && name != &group.name
        {
            return false;
        }
        if let Some(category) = self.category
            && category != group.category
        {
            return false;
        }
        if let Some(is_main) = self.is_main
            && is_main != group.is_main
        {
            return false;
        }
        if let Some(text) = &self.text {
            let Some(token) = &group.search_token else {
                return false;
            };
            let tokens = search_terms(token);
            return search_terms(text).iter().all(|term| tokens.contains(term));
        }
        true
    }
}

/// Split text into search terms the way the SurrealDB `group_analyzer` does:
/// on whitespace and punctuation, and wherever letters meet digits
pub fn search_terms(text: &str) -> Vec<&str> {
    #[derive(PartialEq)]
    enum Class {
        Letter,
        Digit,
    }
    let class_of = |c: char| {
        if c.is_numeric() {
            Some(Class::Digit)
        } else if c.is_alphabetic() {
            Some(Class::Letter)
        } else {
            None
        }
    };

    let mut terms = Vec::new();
    let mut start: Option<(usize, Class)> = None;
    for (index, c) in text.char_indices() {
        let class = class_of(c);
        match (&start, class) {
            (Some((_, current)), Some(next)) if *current == next => {}
            (_, next) => {
                if let Some((begin, _)) = start.take() {
                    terms.push(&text[begin..index]);
                }
                start = next.map(|class| (index, class));
            }
        }
    }
    if let Some((begin, _)) = start {
        terms.push(&text[begin..]);
    }
    terms
}

/// How many documents a mutation may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLimit {
    /// Only the first matching document
    One,
    /// Every matching document
    All,
}

/// Field visibility for reads.
///
/// The search token and the member list are hidden unless requested.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Projection {
    /// Include the derived search token
    pub search_token: bool,

    /// Include the member list
    pub members: bool,
}

impl Projection {
    /// Include every field
    pub fn full() -> Self {
        Self {
            search_token: true,
            members: true,
        }
    }

    pub fn with_search_token(mut self) -> Self {
        self.search_token = true;
        self
    }

    pub fn with_members(mut self) -> Self {
        self.members = true;
        self
    }

    /// Strip the fields this projection hides
    pub fn apply(&self, mut group: Group) -> Group {
        if !self.search_token {
            group.search_token = None;
        }
        if !self.members {
            group.members = None;
        }
        group
    }
}
