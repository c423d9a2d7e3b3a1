//! Member records, read views and query-by-example probes.
//!
//! # Responsibility
//! - Define the persisted member shape and its insert form.
//! - Define `MemberView`, the joined member + team-name projection.
//! - Expose member fields to store-agnostic filters and orderings.
//!   Only `MemberView` is a `FieldSource`: a bare `Member` cannot answer
//!   `TeamName`.
//!
//! # Invariants
//! - `username` is non-empty after trimming.
//! - `age` is never negative.
//! - `team_id`, when set, references an existing team.

use crate::model::team::TeamId;
use crate::model::validation::{validate_age, validate_username, ValidationError};
use crate::query::{FieldSource, Filter, Value};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned member identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i64);

impl Display for MemberId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Filterable and sortable member attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberField {
    Id,
    Username,
    Age,
    TeamId,
    /// Name of the member's team; resolved through the team join.
    TeamName,
}

/// Persisted member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub username: String,
    pub age: i32,
    pub team_id: Option<TeamId>,
}

impl Member {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_age(self.age)
    }
}

/// Insert form of a member; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub username: String,
    pub age: i32,
    pub team_id: Option<TeamId>,
}

impl NewMember {
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            username: username.into(),
            age,
            team_id: None,
        }
    }

    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_age(self.age)
    }

    /// Attaches the store-assigned id.
    pub fn into_member(self, id: MemberId) -> Member {
        Member {
            id,
            username: self.username,
            age: self.age,
            team_id: self.team_id,
        }
    }
}

/// Member joined with its team name, assembled eagerly by one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
    pub id: MemberId,
    pub username: String,
    pub age: i32,
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
}

impl MemberView {
    pub fn from_member(member: Member, team_name: Option<String>) -> Self {
        Self {
            id: member.id,
            username: member.username,
            age: member.age,
            team_id: member.team_id,
            team_name,
        }
    }

    /// Drops the team name.
    pub fn into_member(self) -> Member {
        Member {
            id: self.id,
            username: self.username,
            age: self.age,
            team_id: self.team_id,
        }
    }
}

impl FieldSource<MemberField> for MemberView {
    fn field_value(&self, field: MemberField) -> Option<Value> {
        match field {
            MemberField::Id => Some(Value::Int(self.id.0)),
            MemberField::Username => Some(Value::Text(self.username.clone())),
            MemberField::Age => Some(Value::from(self.age)),
            MemberField::TeamId => self.team_id.map(|id| Value::Int(id.0)),
            MemberField::TeamName => self.team_name.clone().map(Value::Text),
        }
    }
}

/// Query-by-example probe. Unset fields are ignored when matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProbe {
    pub username: Option<String>,
    pub age: Option<i32>,
    pub team_name: Option<String>,
}

impl MemberProbe {
    pub fn username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    /// Equality conjunction over the fields that are set.
    pub fn to_filter(&self) -> Filter<MemberField> {
        let mut filter = Filter::All;
        if let Some(username) = &self.username {
            filter = filter.and(Filter::eq(MemberField::Username, username.as_str()));
        }
        if let Some(age) = self.age {
            filter = filter.and(Filter::eq(MemberField::Age, age));
        }
        if let Some(team_name) = &self.team_name {
            filter = filter.and(Filter::eq(MemberField::TeamName, team_name.as_str()));
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::{Member, MemberField, MemberId, MemberProbe, MemberView, NewMember};
    use crate::model::team::TeamId;
    use crate::model::validation::ValidationError;
    use crate::query::Filter;

    #[test]
    fn new_member_validation_rejects_blank_username_and_negative_age() {
        assert_eq!(
            NewMember::new("  ", 10).validate(),
            Err(ValidationError::EmptyUsername)
        );
        assert_eq!(
            NewMember::new("AAA", -1).validate(),
            Err(ValidationError::NegativeAge(-1))
        );
        assert!(NewMember::new("AAA", 0).validate().is_ok());
    }

    #[test]
    fn empty_probe_matches_everything() {
        assert_eq!(MemberProbe::default().to_filter(), Filter::All);
    }

    #[test]
    fn probe_ignores_unset_fields() {
        let probe = MemberProbe::username("m1");
        let filter = probe.to_filter();
        assert_eq!(filter, Filter::eq(MemberField::Username, "m1"));

        let member = Member {
            id: MemberId(1),
            username: "m1".to_string(),
            age: 42,
            team_id: Some(TeamId(3)),
        };
        let view = MemberView::from_member(member.clone(), Some("teamA".to_string()));
        assert!(filter.matches(&view));

        let in_team = MemberProbe {
            team_name: Some("teamA".to_string()),
            ..probe
        };
        assert!(in_team.to_filter().matches(&view));
        assert_eq!(view.into_member(), member);
    }

    #[test]
    fn member_serializes_ids_as_plain_numbers() {
        let member = NewMember::new("AAA", 10)
            .with_team(TeamId(7))
            .into_member(MemberId(3));
        let json = serde_json::to_value(&member).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["team_id"], 7);
        assert_eq!(json["username"], "AAA");
    }
}
