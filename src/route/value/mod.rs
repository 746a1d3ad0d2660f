use aide::axum::{routing::get_with, ApiRouter};

use crate::{error, AppState};

pub mod model;
pub mod route;

pub type RouteError = error::RouteError;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/:type", get_with(get_values, get_values_docs))
		.api_route("/:type/search", get_with(search_values, search_values_docs))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_list_values_in_position_order() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server
			.get("/admin/values/address")
			.add_cookie(session_cookie(fixture.user_session))
			.await;

		assert_eq!(response.status_code(), 200);

		let values = response.json::<Vec<Value>>();
		let names = values
			.iter()
			.map(|value| value["value"].as_str().unwrap())
			.collect::<Vec<_>>();

		assert_eq!(names, ["Grove Street", "Alta Street", "Vinewood Boulevard"]);
		assert!(values.iter().all(|value| value["type"] == "ADDRESS"));
	}

	#[tokio::test]
	async fn test_search_is_case_insensitive() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server
			.get("/admin/values/ADDRESS/search")
			.add_query_param("query", "STREET")
			.add_cookie(session_cookie(fixture.user_session))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Vec<Value>>().len(), 2);
	}

	#[tokio::test]
	async fn test_empty_search_matches_everything() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server
			.get("/admin/values/address/search")
			.add_cookie(session_cookie(fixture.user_session))
			.await;

		assert_eq!(response.json::<Vec<Value>>().len(), 3);
	}

	#[tokio::test]
	async fn test_search_is_limited() {
		let fixture = Fixture::new().await;

		for index in 0..40 {
			fixture
				.store
				.insert_value(ValueType::Weapon, &format!("Pistol {index}"))
				.await;
		}

		let response = fixture
			.server()
			.get("/admin/values/weapon/search")
			.add_query_param("query", "pistol")
			.add_cookie(session_cookie(fixture.user_session))
			.await;

		assert_eq!(response.json::<Vec<Value>>().len(), 35);
	}

	#[tokio::test]
	async fn test_unknown_type_is_rejected() {
		let fixture = Fixture::new().await;

		let response = fixture
			.server()
			.get("/admin/values/spaceship/search")
			.add_cookie(session_cookie(fixture.user_session))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "invalid_path");
	}

	#[tokio::test]
	async fn test_values_require_session() {
		let fixture = Fixture::new().await;

		let response = fixture.server().get("/admin/values/address").await;

		assert_eq!(response.status_code(), 401);
	}
}
