use aide::axum::{routing::get_with, ApiRouter};
use axum::{
	extract::{Request, State},
	http::StatusCode,
	middleware::{self, Next},
};
use uuid::Uuid;

use crate::{
	error,
	feature::{self, Feature},
	permission::{self, Guard, Permission},
	AppState, Database,
};

pub mod model;
pub mod route;

/// Managing posts requires the explicit permission, or any rank above the base rank.
pub const GUARD: Guard = Guard::new(
	&[Permission::ManageCourthousePosts],
	permission::is_elevated,
);

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(Uuid),
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes(state: AppState) -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_posts, get_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/:id",
			get_with(get_post, get_post_docs)
				.put_with(update_post, update_post_docs)
				.delete_with(delete_post, delete_post_docs),
		)
		.layer(middleware::from_fn_with_state(
			state,
			|State(database): State<Database>, request: Request, next: Next| {
				feature::gate(Feature::Courthouse, database, request, next)
			},
		))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", post.to_string())
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	fn body(title: &str) -> Value {
		json!({
			"title": title,
			"descriptionData": [{ "type": "paragraph", "children": [{ "text": "Court is in session." }] }],
		})
	}

	#[tokio::test]
	async fn test_list_is_newest_first_with_owner_projection() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		for title in ["First", "Second", "Third"] {
			let response = server
				.post("/courthouse-posts")
				.add_cookie(session_cookie(fixture.admin_session))
				.json(&body(title))
				.await;

			assert_eq!(response.status_code(), 200);
		}

		let response = server
			.get("/courthouse-posts")
			.add_cookie(session_cookie(fixture.user_session))
			.await;

		assert_eq!(response.status_code(), 200);

		let posts = response.json::<Vec<Value>>();
		let titles = posts.iter().map(|p| p["title"].clone()).collect::<Vec<_>>();

		assert_eq!(titles, vec![json!("Third"), json!("Second"), json!("First")]);
		assert_eq!(posts[0]["user"]["username"], "admin");
		assert!(posts[0]["user"].get("permissions").is_none());
	}

	#[tokio::test]
	async fn test_create_stamps_caller_as_owner() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let mut input = body("Notice");
		input["userId"] = json!(fixture.user_id);

		let response = server
			.post("/courthouse-posts")
			.add_cookie(session_cookie(fixture.admin_session))
			.json(&input)
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["userId"], json!(fixture.admin_id));
		assert_eq!(response.json::<Value>()["user"]["id"], json!(fixture.admin_id));
	}

	#[tokio::test]
	async fn test_create_forbidden_for_base_rank_without_permission() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server
			.post("/courthouse-posts")
			.add_cookie(session_cookie(fixture.user_session))
			.json(&body("Notice"))
			.await;

		assert_eq!(response.status_code(), 403);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"missing_permission"
		);
		assert!(fixture.store.list_courthouse_posts().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_create_allowed_for_base_rank_with_permission() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server
			.post("/courthouse-posts")
			.add_cookie(session_cookie(fixture.clerk_session))
			.json(&body("Notice"))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["userId"], json!(fixture.clerk_id));
	}

	#[tokio::test]
	async fn test_create_rejects_invalid_body() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server
			.post("/courthouse-posts")
			.add_cookie(session_cookie(fixture.admin_session))
			.json(&json!({ "title": "", "descriptionData": [] }))
			.await;

		assert_eq!(response.status_code(), 400);

		let errors = response.json::<Value>()["errors"].clone();
		let fields = errors
			.as_array()
			.unwrap()
			.iter()
			.filter_map(|e| e["field"].as_str())
			.collect::<Vec<_>>();

		assert_eq!(fields.len(), 2);

		let response = server
			.post("/courthouse-posts")
			.add_cookie(session_cookie(fixture.admin_session))
			.json(&json!({ "title": "Notice" }))
			.await;

		assert_eq!(response.status_code(), 400);

		let errors = response.json::<Value>()["errors"].clone();

		assert!(errors
			.as_array()
			.unwrap()
			.iter()
			.any(|e| e["field"] == "description_data" && e["content"] == "required"));

		let response = server
			.post("/courthouse-posts")
			.add_cookie(session_cookie(fixture.admin_session))
			.json(&json!({ "title": 7, "descriptionData": [{ "text": "Hear ye" }] }))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "title");
		assert!(fixture.store.list_courthouse_posts().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_update_and_delete_via_rank_fallback() {
		let fixture = Fixture::new().await;
		let server = fixture.server();
		let post = fixture.post_by(fixture.clerk_id, "Original").await;

		let response = server
			.put(&format!("/courthouse-posts/{}", post.id))
			.add_cookie(session_cookie(fixture.admin_session))
			.json(&body("Edited"))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["title"], "Edited");
		// Ownership never changes through an update
		assert_eq!(response.json::<Value>()["userId"], json!(fixture.clerk_id));

		let response = server
			.delete(&format!("/courthouse-posts/{}", post.id))
			.add_cookie(session_cookie(fixture.admin_session))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>(), json!(true));
		assert!(fixture.store.find_courthouse_post(post.id).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_update_and_delete_via_explicit_permission() {
		let fixture = Fixture::new().await;
		let server = fixture.server();
		let post = fixture.post_by(fixture.admin_id, "Original").await;

		let response = server
			.put(&format!("/courthouse-posts/{}", post.id))
			.add_cookie(session_cookie(fixture.clerk_session))
			.json(&body("Edited"))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = server
			.delete(&format!("/courthouse-posts/{}", post.id))
			.add_cookie(session_cookie(fixture.clerk_session))
			.await;

		assert_eq!(response.status_code(), 200);
	}

	#[tokio::test]
	async fn test_update_and_delete_forbidden_without_mutation() {
		let fixture = Fixture::new().await;
		let server = fixture.server();
		let post = fixture.post_by(fixture.admin_id, "Original").await;

		let response = server
			.put(&format!("/courthouse-posts/{}", post.id))
			.add_cookie(session_cookie(fixture.user_session))
			.json(&body("Edited"))
			.await;

		assert_eq!(response.status_code(), 403);

		let response = server
			.delete(&format!("/courthouse-posts/{}", post.id))
			.add_cookie(session_cookie(fixture.user_session))
			.await;

		assert_eq!(response.status_code(), 403);

		let stored = fixture.store.find_courthouse_post(post.id).await.unwrap();

		assert_eq!(stored.map(|p| p.title).as_deref(), Some("Original"));
	}

	#[tokio::test]
	async fn test_unknown_post_is_not_found_for_every_actor() {
		let fixture = Fixture::new().await;
		let server = fixture.server();
		let id = uuid::Uuid::new_v4();

		for session in [fixture.admin_session, fixture.clerk_session, fixture.user_session] {
			let response = server
				.put(&format!("/courthouse-posts/{id}"))
				.add_cookie(session_cookie(session))
				.json(&body("Edited"))
				.await;

			assert_eq!(response.status_code(), 404);
			assert_eq!(response.json::<Value>()["errors"][0]["content"], "unknown_post");

			let response = server
				.delete(&format!("/courthouse-posts/{id}"))
				.add_cookie(session_cookie(session))
				.await;

			assert_eq!(response.status_code(), 404);
		}
	}

	#[tokio::test]
	async fn test_created_post_is_listed_first() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		fixture.post_by(fixture.admin_id, "Older").await;

		let created = server
			.post("/courthouse-posts")
			.add_cookie(session_cookie(fixture.admin_session))
			.json(&body("Newest"))
			.await
			.json::<Value>();

		let posts = server
			.get("/courthouse-posts")
			.add_cookie(session_cookie(fixture.admin_session))
			.await
			.json::<Vec<Value>>();

		assert_eq!(posts[0]["id"], created["id"]);

		let response = server
			.get(&format!("/courthouse-posts/{}", created["id"].as_str().unwrap()))
			.add_cookie(session_cookie(fixture.user_session))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["title"], "Newest");
	}

	#[tokio::test]
	async fn test_disabled_feature_hides_every_route() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		fixture
			.store
			.set_feature(Feature::Courthouse, false)
			.await
			.unwrap();

		let response = server
			.get("/courthouse-posts")
			.add_cookie(session_cookie(fixture.admin_session))
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"feature_disabled"
		);

		let response = server
			.post("/courthouse-posts")
			.add_cookie(session_cookie(fixture.admin_session))
			.json(&body("Notice"))
			.await;

		assert_eq!(response.status_code(), 404);
		assert!(fixture.store.list_courthouse_posts().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_requires_authentication() {
		let fixture = Fixture::new().await;
		let server = fixture.server();

		let response = server.get("/courthouse-posts").await;

		assert_eq!(response.status_code(), 401);
	}
}
