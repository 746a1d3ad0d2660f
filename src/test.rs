//! Shared fixtures for the test suite.

use std::{
	path::PathBuf,
	sync::{Arc, Mutex},
};

use axum::{body::Body, http, Router};
use axum_test::TestServer;
use tower::ServiceExt;
use uuid::Uuid;

pub use axum::http::{header::AUTHORIZATION, HeaderValue};
pub use serde_json::{json, Value};

pub use crate::{
	feature::Feature,
	permission::{Permission, Rank},
	route::value::model::ValueType,
	store::{MemoryStore, Store},
};
use crate::{
	client::{
		self,
		transport::{self, Transport},
	},
	route::courthouse::model::{CourthousePost, CourthousePostInput},
	upload::Uploads,
	AppState,
};

/// The smallest valid PNG header, enough for content sniffing.
pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const BOUNDARY: &str = "roleplay-cad-test-boundary";

/// A seeded in-memory deployment.
///
/// * `owner` has the owner rank.
/// * `admin` has the admin rank and no permissions.
/// * `clerk` has the base rank and `ManageCourthousePosts`.
/// * `user` has the base rank, no permissions and owns a vehicle.
pub struct Fixture {
	pub store: Arc<MemoryStore>,
	pub owner_id: Uuid,
	pub admin_id: Uuid,
	pub clerk_id: Uuid,
	pub user_id: Uuid,
	pub owner_session: Uuid,
	pub admin_session: Uuid,
	pub clerk_session: Uuid,
	pub user_session: Uuid,
	pub user_api_key: Uuid,
	pub admin_citizen_id: Uuid,
	pub user_citizen_id: Uuid,
	pub vehicle_id: Uuid,
	uploads: PathBuf,
}

impl Fixture {
	pub async fn new() -> Self {
		let store = MemoryStore::new();

		let owner_id = store.insert_user("owner", Rank::Owner, Vec::new()).await;
		let admin_id = store.insert_user("admin", Rank::Admin, Vec::new()).await;
		let clerk_id = store
			.insert_user("clerk", Rank::User, vec![Permission::ManageCourthousePosts])
			.await;
		let user_id = store.insert_user("user", Rank::User, Vec::new()).await;

		let admin_citizen_id = store.insert_citizen(admin_id, "Jane", "Admin").await;
		let user_citizen_id = store.insert_citizen(user_id, "John", "Doe").await;
		let vehicle_id = store
			.insert_vehicle(user_citizen_id, "5ABC123", "Declasse Vigero")
			.await;

		store
			.insert_value_at(ValueType::Address, "Grove Street", Some(0))
			.await;
		store
			.insert_value_at(ValueType::Address, "Alta Street", Some(1))
			.await;
		store
			.insert_value(ValueType::Address, "Vinewood Boulevard")
			.await;

		Self {
			owner_session: store.insert_session(owner_id).await,
			admin_session: store.insert_session(admin_id).await,
			clerk_session: store.insert_session(clerk_id).await,
			user_session: store.insert_session(user_id).await,
			user_api_key: store.insert_api_key(user_id).await,
			store: Arc::new(store),
			owner_id,
			admin_id,
			clerk_id,
			user_id,
			admin_citizen_id,
			user_citizen_id,
			vehicle_id,
			uploads: std::env::temp_dir().join(format!("roleplay-cad-{}", Uuid::new_v4())),
		}
	}

	pub fn uploads_dir(&self) -> &std::path::Path {
		&self.uploads
	}

	pub fn state(&self) -> AppState {
		AppState {
			database: self.store.clone(),
			uploads: Uploads::new(&self.uploads),
		}
	}

	pub fn router(&self) -> Router {
		crate::app(self.state(), None)
	}

	pub fn server(&self) -> TestServer {
		TestServer::new(self.router()).unwrap()
	}

	/// A client transport that drives the router in-process as `session`.
	pub fn transport(&self, session: Uuid) -> Arc<dyn Transport> {
		Arc::new(RouterTransport {
			router: self.router(),
			session,
		})
	}

	pub async fn post_by(&self, user_id: Uuid, title: &str) -> CourthousePost {
		self.store
			.create_courthouse_post(
				user_id,
				&CourthousePostInput {
					title: title.into(),
					description_data: json!([{ "type": "paragraph", "children": [{ "text": title }] }]),
				},
			)
			.await
			.unwrap()
	}
}

impl Drop for Fixture {
	fn drop(&mut self) {
		let _ = std::fs::remove_dir_all(&self.uploads).or_else(|_| std::fs::remove_file(&self.uploads));
	}
}

pub fn session_cookie(session: Uuid) -> cookie::Cookie<'static> {
	crate::session::create_cookie(session)
}

pub fn bearer(key: Uuid) -> HeaderValue {
	HeaderValue::from_str(&format!("Bearer {key}")).unwrap()
}

/// Encodes multipart parts, returning the content type and the body.
pub fn multipart(parts: &[transport::Part]) -> (String, Vec<u8>) {
	let mut body = Vec::new();

	for part in parts {
		body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
		body.extend_from_slice(
			format!(
				"Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
				part.name, part.file_name
			)
			.as_bytes(),
		);
		body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
		body.extend_from_slice(&part.bytes);
		body.extend_from_slice(b"\r\n");
	}

	body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

	(format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

pub fn multipart_image(file_name: &str, content_type: &str, bytes: &[u8]) -> (String, Vec<u8>) {
	multipart(&[transport::Part {
		name: "image".into(),
		file_name: file_name.into(),
		content_type: content_type.into(),
		bytes: bytes.to_vec(),
	}])
}

/// Sends client requests straight into the router.
struct RouterTransport {
	router: Router,
	session: Uuid,
}

#[axum::async_trait]
impl Transport for RouterTransport {
	async fn send(&self, request: transport::Request) -> Result<transport::Response, client::Error> {
		let builder = http::Request::builder()
			.method(request.method)
			.uri(request.path)
			.header(http::header::COOKIE, crate::session::header_value(self.session));

		let request = match request.body {
			transport::Body::Empty => builder.body(Body::empty()),
			transport::Body::Json(json) => builder
				.header(http::header::CONTENT_TYPE, "application/json")
				.body(Body::from(serde_json::to_vec(&json)?)),
			transport::Body::Multipart(parts) => {
				let (content_type, body) = multipart(&parts);

				builder
					.header(http::header::CONTENT_TYPE, content_type)
					.body(Body::from(body))
			}
		}
		.unwrap();

		let response = self.router.clone().oneshot(request).await.unwrap();
		let status = response.status();
		let body = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();

		Ok(transport::Response { status, body })
	}
}

/// Records the method and path of every request passing through.
pub struct Recording {
	inner: Arc<dyn Transport>,
	requests: Mutex<Vec<String>>,
}

impl Recording {
	pub fn new(inner: Arc<dyn Transport>) -> Arc<Self> {
		Arc::new(Self {
			inner,
			requests: Mutex::default(),
		})
	}

	/// Every request so far, as `METHOD /path`.
	pub fn requests(&self) -> Vec<String> {
		self.requests.lock().unwrap().clone()
	}
}

#[axum::async_trait]
impl Transport for Recording {
	async fn send(&self, request: transport::Request) -> Result<transport::Response, client::Error> {
		self.requests
			.lock()
			.unwrap()
			.push(format!("{} {}", request.method, request.path));
		self.inner.send(request).await
	}
}
