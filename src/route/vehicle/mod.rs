use aide::axum::{routing::post_with, ApiRouter};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown vehicle {0}")]
	UnknownVehicle(Uuid),
	#[error("unknown citizen {0}")]
	UnknownCitizen(Uuid),
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route(
		"/transfer/:id",
		post_with(transfer_vehicle, transfer_vehicle_docs),
	)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownVehicle(..) | Self::UnknownCitizen(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownVehicle(vehicle) => error::Message::new("unknown_vehicle")
				.detail("vehicle", vehicle.to_string())
				.into_vec(),
			Self::UnknownCitizen(citizen) => error::Message::new("unknown_citizen")
				.field("owner_id")
				.detail("citizen", citizen.to_string())
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_transfer_reassigns_owner() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server
			.post(&format!("/vehicles/transfer/{}", fixture.vehicle_id))
			.add_cookie(session_cookie(fixture.user_session))
			.json(&json!({ "ownerId": fixture.admin_citizen_id, "name": "Jane Admin" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let vehicle = response.json::<Value>();

		assert_eq!(vehicle["citizenId"], json!(fixture.admin_citizen_id));
		assert_eq!(vehicle["userId"], json!(fixture.admin_id));
		assert_eq!(vehicle["citizen"]["name"], "Jane");
		assert_eq!(vehicle["plate"], "5ABC123");

		let stored = fixture.store.find_vehicle(fixture.vehicle_id).await.unwrap().unwrap();

		assert_eq!(stored.citizen_id, fixture.admin_citizen_id);
	}

	#[tokio::test]
	async fn test_transfer_unknown_vehicle() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server
			.post(&format!("/vehicles/transfer/{}", uuid::Uuid::new_v4()))
			.add_cookie(session_cookie(fixture.user_session))
			.json(&json!({ "ownerId": fixture.admin_citizen_id, "name": "Jane Admin" }))
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "unknown_vehicle");
	}

	#[tokio::test]
	async fn test_transfer_of_foreign_vehicle_is_not_found() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server
			.post(&format!("/vehicles/transfer/{}", fixture.vehicle_id))
			.add_cookie(session_cookie(fixture.admin_session))
			.json(&json!({ "ownerId": fixture.admin_citizen_id, "name": "Jane Admin" }))
			.await;

		assert_eq!(response.status_code(), 404);

		let stored = fixture.store.find_vehicle(fixture.vehicle_id).await.unwrap().unwrap();

		assert_eq!(stored.user_id, fixture.user_id);
	}

	#[tokio::test]
	async fn test_transfer_to_unknown_citizen_commits_nothing() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server
			.post(&format!("/vehicles/transfer/{}", fixture.vehicle_id))
			.add_cookie(session_cookie(fixture.user_session))
			.json(&json!({ "ownerId": uuid::Uuid::new_v4(), "name": "Nobody" }))
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "unknown_citizen");

		let stored = fixture.store.find_vehicle(fixture.vehicle_id).await.unwrap().unwrap();

		assert_eq!(stored.user_id, fixture.user_id);
	}

	#[tokio::test]
	async fn test_transfer_validates_body() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server
			.post(&format!("/vehicles/transfer/{}", fixture.vehicle_id))
			.add_cookie(session_cookie(fixture.user_session))
			.json(&json!({ "ownerId": "", "name": "" }))
			.await;

		assert_eq!(response.status_code(), 400);
	}
}
