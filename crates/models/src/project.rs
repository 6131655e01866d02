use serde::{Deserialize, Deserializer, Serialize};

use crate::Id;

/// An event the user participates in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

/// Membership row of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: Id,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub role: String,
}

/// Body of `GET /events/get-event-id/{id}`'s `event` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

fn null_as_empty<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}
