// Typed identifiers for every entity in the land aggregate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Authenticated user, issued by the identity collaborator
    UserId
);
entity_id!(LandId);
entity_id!(SectionId);
entity_id!(TaskId);
entity_id!(HistoryId);
entity_id!(InterestId);

/// Reference to any entity the engine can resolve to its owning land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Land(LandId),
    Section(SectionId),
    Task(TaskId),
    Interest(InterestId),
}

impl EntityRef {
    pub fn kind(&self) -> &'static str {
        match self {
            EntityRef::Land(_) => "land",
            EntityRef::Section(_) => "section",
            EntityRef::Task(_) => "task",
            EntityRef::Interest(_) => "interest",
        }
    }

    /// Bare id without the entity kind
    pub fn id_string(&self) -> String {
        match self {
            EntityRef::Land(id) => id.to_string(),
            EntityRef::Section(id) => id.to_string(),
            EntityRef::Task(id) => id.to_string(),
            EntityRef::Interest(id) => id.to_string(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Land(id) => write!(f, "land {id}"),
            EntityRef::Section(id) => write!(f, "section {id}"),
            EntityRef::Task(id) => write!(f, "task {id}"),
            EntityRef::Interest(id) => write!(f, "interest {id}"),
        }
    }
}
