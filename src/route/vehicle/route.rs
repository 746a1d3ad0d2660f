use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Session},
	openapi::tag,
	store::Store,
	Database,
};

use super::{model, Error, RouteError};

/// Transfer vehicle
/// Hands one of your vehicles over to another citizen. Both the vehicle and the new owner must exist.
#[route(tag = tag::VEHICLE, error = 400, error = 401, error = 404)]
#[tracing::instrument(skip_all, fields(user = %session.user.id, vehicle = %path.id))]
pub async fn transfer_vehicle(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::TransferVehicleInput>,
) -> Result<Json<model::Vehicle>, RouteError> {
	let vehicle = database
		.find_vehicle(path.id)
		.await?
		.filter(|vehicle| vehicle.user_id == session.user.id)
		.ok_or(Error::UnknownVehicle(path.id))?;

	// Validation guarantees a well-formed id
	let owner_id = input.owner_id().ok_or(Error::UnknownCitizen(uuid::Uuid::nil()))?;
	let owner = database
		.find_citizen(owner_id)
		.await?
		.ok_or(Error::UnknownCitizen(owner_id))?;

	let vehicle = database
		.transfer_vehicle(vehicle.id, session.user.id, &owner)
		.await?
		.ok_or(Error::UnknownVehicle(vehicle.id))?;

	tracing::info!(citizen = %owner.id, name = %input.name, "transferred vehicle");

	Ok(Json(vehicle))
}
