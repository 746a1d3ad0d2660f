pub use crate::route::model::IdInput;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
	Uuid::parse_str(value)
		.map(|_| ())
		.map_err(|_| ValidationError::new("uuid"))
}

/// A character owned by a user.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Citizen {
	pub id: Uuid,
	pub user_id: Uuid,
	pub name: String,
	pub surname: String,
}

/// The public view of a citizen that is joined onto the records they own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CitizenProjection {
	pub id: Uuid,
	pub name: String,
	pub surname: String,
}

impl From<&Citizen> for CitizenProjection {
	fn from(citizen: &Citizen) -> Self {
		Self {
			id: citizen.id,
			name: citizen.name.clone(),
			surname: citizen.surname.clone(),
		}
	}
}

/// A registered vehicle.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
	pub id: Uuid,
	/// The licence plate of the vehicle.
	pub plate: String,
	/// The make and model of the vehicle.
	pub model: String,
	/// The user that controls the owning citizen.
	pub user_id: Uuid,
	/// The citizen that owns the vehicle.
	pub citizen_id: Uuid,
	pub citizen: CitizenProjection,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A request to hand a vehicle over to another citizen.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferVehicleInput {
	/// The id of the citizen that becomes the new owner.
	#[validate(length(min = 1), custom(function = "validate_uuid"))]
	pub owner_id: String,
	/// The display name of the new owner, as picked in the owner field.
	#[validate(length(min = 1, max = 255))]
	pub name: String,
}

impl TransferVehicleInput {
	/// The parsed owner id. Only valid after validation succeeded.
	pub fn owner_id(&self) -> Option<Uuid> {
		Uuid::parse_str(&self.owner_id).ok()
	}
}
