//! Audit team roster.
//!
//! A member id arrives in one of three shapes: a number, a string, or the
//! literal `0` meaning "nobody". Call sites branch on which one they got,
//! so the shapes are kept apart as a tagged variant.
//!
//! Wire rules:
//!   encode  Integer(n) -> n      Text(s) -> "s"      Absent -> 0
//!   decode  0 -> Absent          n -> Integer(n)     "s" -> Text(s)
//! Any other JSON shape is rejected. `Integer` holds a `NonZeroI64`, so 0
//! is only ever `Absent` and every id round-trips unchanged.

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{fmt, num::NonZeroI64};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberId {
    Integer(NonZeroI64),
    Text(String),
    Absent,
}

impl MemberId {
    pub fn is_absent(&self) -> bool {
        matches!(self, MemberId::Absent)
    }
}

impl From<i64> for MemberId {
    fn from(id: i64) -> Self {
        NonZeroI64::new(id).map_or(MemberId::Absent, MemberId::Integer)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        MemberId::Text(id.to_string())
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberId::Integer(n) => write!(f, "{n}"),
            MemberId::Text(s)    => f.write_str(s),
            MemberId::Absent     => f.write_str("0"),
        }
    }
}

impl Serialize for MemberId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MemberId::Integer(n) => serializer.serialize_i64(n.get()),
            MemberId::Text(s)    => serializer.serialize_str(s),
            MemberId::Absent     => serializer.serialize_i64(0),
        }
    }
}

struct MemberIdVisitor;

impl<'de> Visitor<'de> for MemberIdVisitor {
    type Value = MemberId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer, a string, or 0")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<MemberId, E> {
        Ok(MemberId::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<MemberId, E> {
        i64::try_from(v)
            .map(MemberId::from)
            .map_err(|_| E::custom(format!("member id {v} out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<MemberId, E> {
        Ok(MemberId::Text(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for MemberId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MemberIdVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: MemberId,
    pub name: String,
    pub role: String,
}

impl TeamMember {
    pub fn new(id: MemberId, name: &str, role: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            role: role.to_string(),
        }
    }

    /// The assignment dropdown: "Unassigned", then "Assigned to Me", then
    /// the active members in the order given.
    pub fn roster(active: Vec<TeamMember>) -> Vec<TeamMember> {
        let mut members = Vec::with_capacity(active.len() + 2);
        members.push(TeamMember::new(MemberId::Absent, "Unassigned", ""));
        members.push(TeamMember::new(MemberId::from("me"), "Assigned to Me", "Current User"));
        members.extend(active);
        members
    }
}
