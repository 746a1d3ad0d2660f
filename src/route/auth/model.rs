use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permission::{Permission, Rank};

/// A single user.
///
/// Users are the actors of every permission check and the owners of
/// most records. They are never created or removed by this service.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The username that is displayed to the public.
	pub username: String,
	/// The coarse role tier of the user.
	pub rank: Rank,
	/// The fine-grained capabilities granted to the user.
	pub permissions: Vec<Permission>,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The restricted view of a user that is joined onto the records they own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProjection {
	pub id: Uuid,
	pub username: String,
	pub rank: Rank,
}

impl From<&User> for UserProjection {
	fn from(user: &User) -> Self {
		Self {
			id: user.id,
			username: user.username.clone(),
			rank: user.rank,
		}
	}
}
