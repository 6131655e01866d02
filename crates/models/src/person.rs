use serde::{Deserialize, Serialize};

use crate::errors::{require, ModelError};
use crate::project::Participant;
use crate::user::UserProfile;
use crate::Id;

/// Where a person entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonOrigin {
    /// Joined from the event's participants and the user profile.
    Backend,
    /// Added in this session only; gone after the next reload.
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub role: String,
    pub origin: PersonOrigin,
}

impl Person {
    pub fn from_participant(participant: &Participant, profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.username,
            email: profile.email,
            role: participant.role.clone(),
            origin: PersonOrigin::Backend,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonDraft {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl PersonDraft {
    /// Name and email are required; role may be blank.
    pub fn into_local(self, id: Id) -> Result<Person, ModelError> {
        Ok(Person {
            id,
            name: require("name", &self.name)?,
            email: require("email", &self.email)?,
            role: self.role.trim().to_string(),
            origin: PersonOrigin::Local,
        })
    }
}
