use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// The most results a search returns.
pub const SEARCH_LIMIT: usize = 35;

/// The kind of reference data a value belongs to.
///
/// Paths accept the lowercase name as well, e.g. `/admin/values/address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
	#[serde(alias = "address")]
	Address,
	#[serde(alias = "license")]
	License,
	#[serde(alias = "gender")]
	Gender,
	#[serde(alias = "ethnicity")]
	Ethnicity,
	#[serde(alias = "vehicle")]
	Vehicle,
	#[serde(alias = "weapon")]
	Weapon,
	#[serde(alias = "blood_group", alias = "blood-group")]
	BloodGroup,
	#[serde(alias = "impound_lot", alias = "impound-lot")]
	ImpoundLot,
}

impl ValueType {
	pub const ALL: [Self; 8] = [
		Self::Address,
		Self::License,
		Self::Gender,
		Self::Ethnicity,
		Self::Vehicle,
		Self::Weapon,
		Self::BloodGroup,
		Self::ImpoundLot,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Address => "ADDRESS",
			Self::License => "LICENSE",
			Self::Gender => "GENDER",
			Self::Ethnicity => "ETHNICITY",
			Self::Vehicle => "VEHICLE",
			Self::Weapon => "WEAPON",
			Self::BloodGroup => "BLOOD_GROUP",
			Self::ImpoundLot => "IMPOUND_LOT",
		}
	}

	/// The path segment the client uses for this type.
	pub fn path(self) -> String {
		self.as_str().to_lowercase()
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for ValueType {
	type Err = crate::permission::ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| crate::permission::ParseError::new("value type", s))
	}
}

/// A single piece of reference data, e.g. an address or a weapon model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Value {
	pub id: Uuid,
	#[serde(rename = "type")]
	pub kind: ValueType,
	/// The display text of the value.
	pub value: String,
	/// The manual sort order within its type.
	pub position: Option<i32>,
	pub is_default: bool,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Value {
	/// Whether the value matches a search query.
	///
	/// Matching is a case-insensitive substring test, so an empty query matches everything.
	pub fn matches(&self, query: &str) -> bool {
		self.value.to_lowercase().contains(&query.to_lowercase())
	}
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct TypePath {
	#[serde(rename = "type")]
	pub kind: ValueType,
}

#[derive(Debug, Default, Deserialize, JsonSchema, Validate)]
pub struct SearchQuery {
	/// The text to search for. Empty matches every value.
	#[serde(default)]
	#[validate(length(max = 255))]
	pub query: String,
}
