pub use crate::route::model::IdInput;

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::route::auth::model::UserProjection;

/// Accepts a non-empty array of rich-text nodes.
fn validate_rich_text(value: &serde_json::Value) -> Result<(), ValidationError> {
	match value.as_array() {
		Some(nodes) if !nodes.is_empty() => Ok(()),
		Some(..) => Err(ValidationError::new("rich_text_empty")),
		None => Err(ValidationError::new("rich_text_not_array")),
	}
}

/// A notice published on the courthouse board.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CourthousePost {
	/// The unique identifier of the post.
	#[readonly]
	pub id: Uuid,
	/// The title of the post.
	#[validate(length(min = 1, max = 255))]
	pub title: String,
	/// The body of the post, as an array of rich-text nodes.
	#[validate(custom(function = "validate_rich_text"))]
	pub description_data: serde_json::Value,
	/// The user that created the post.
	#[readonly]
	pub user_id: Uuid,
	/// The public projection of the user that created the post.
	#[readonly]
	pub user: UserProjection,
	/// The creation time of the post.
	#[readonly]
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// The last time the post was changed.
	#[readonly]
	pub updated_at: chrono::DateTime<chrono::Utc>,
}
