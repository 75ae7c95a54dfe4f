//! Domain models for club groups and their members

pub mod group;

// Re-export important models
pub use group::{
    Category, Group, GroupId, GroupPatch, Member, MemberRole, NewGroup, NewGroupBuilder,
    placeholder_photo,
};
