//! Rank and permission checks.
//!
//! An operation is allowed when the actor holds any of the guard's explicit
//! permissions, or when the guard's fallback predicate accepts the actor.

use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{error::RouteError, route::auth::model::User};

/// A coarse role tier on a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rank {
	Owner,
	Admin,
	User,
}

impl Rank {
	/// The rank every new account starts with.
	pub const BASE: Self = Self::User;

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Owner => "OWNER",
			Self::Admin => "ADMIN",
			Self::User => "USER",
		}
	}
}

impl fmt::Display for Rank {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} {value:?}")]
pub struct ParseError {
	kind: &'static str,
	value: String,
}

impl ParseError {
	pub fn new(kind: &'static str, value: &str) -> Self {
		Self {
			kind,
			value: value.to_owned(),
		}
	}
}

impl FromStr for Rank {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"OWNER" => Ok(Self::Owner),
			"ADMIN" => Ok(Self::Admin),
			"USER" => Ok(Self::User),
			_ => Err(ParseError::new("rank", s)),
		}
	}
}

/// A fine-grained capability granted to a user, independent of their rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Permission {
	ManageCourthousePosts,
	ManageCadSettings,
	ManageValues,
	ManageVehicles,
}

impl Permission {
	pub const ALL: [Self; 4] = [
		Self::ManageCourthousePosts,
		Self::ManageCadSettings,
		Self::ManageValues,
		Self::ManageVehicles,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::ManageCourthousePosts => "ManageCourthousePosts",
			Self::ManageCadSettings => "ManageCadSettings",
			Self::ManageValues => "ManageValues",
			Self::ManageVehicles => "ManageVehicles",
		}
	}
}

impl FromStr for Permission {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|permission| permission.as_str() == s)
			.ok_or_else(|| ParseError::new("permission", s))
	}
}

/// Returns `true` for any rank above the base rank.
pub fn is_elevated(user: &User) -> bool {
	user.rank != Rank::BASE
}

pub fn is_owner(user: &User) -> bool {
	user.rank == Rank::Owner
}

/// The permission requirement of a group of operations.
#[derive(Debug, Clone, Copy)]
pub struct Guard {
	permissions: &'static [Permission],
	fallback: fn(&User) -> bool,
}

impl Guard {
	pub const fn new(permissions: &'static [Permission], fallback: fn(&User) -> bool) -> Self {
		Self {
			permissions,
			fallback,
		}
	}

	pub fn allows(&self, user: &User) -> bool {
		self.permissions
			.iter()
			.any(|permission| user.permissions.contains(permission))
			|| (self.fallback)(user)
	}

	/// Fails with [`RouteError::Forbidden`] unless the user is allowed.
	pub fn authorize<E>(&self, user: &User) -> Result<(), RouteError<E>> {
		if self.allows(user) {
			return Ok(());
		}

		tracing::info!(user = %user.id, rank = %user.rank, "permission denied");
		Err(RouteError::Forbidden)
	}
}
