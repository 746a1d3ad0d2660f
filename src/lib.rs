#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod feature;
pub mod openapi;
pub mod permission;
pub mod ratelimit;
pub mod route;
pub mod session;
pub mod store;
pub mod trace;
pub mod upload;

#[cfg(test)]
mod test;

use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{extract::FromRef, Extension, Router};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

pub use error::RouteError;

pub type Database = Arc<dyn store::Store>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as the store or the upload directory.
///
/// For dependencies only used by a single handler, you can combine states instead.
#[derive(Clone, FromRef)]
pub struct State {
	pub database: Database,
	pub uploads: upload::Uploads,
}

/// Builds the application router.
///
/// Without `limits` nothing is rate limited, which also lifts the need for
/// connect info when serving.
pub fn app(state: AppState, limits: Option<&ratelimit::Limits>) -> Router {
	let mut api = OpenApi::default();

	aide::gen::extract_schemas(true);

	let mut router = ApiRouter::new()
		.nest("/auth", route::auth::routes())
		.nest("/courthouse-posts", route::courthouse::routes(state.clone()))
		.nest("/admin/settings", route::settings::routes(limits))
		.nest("/admin/values", route::value::routes())
		.nest("/vehicles", route::vehicle::routes())
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)));

	if let Some(limits) = limits {
		router = router.layer(GovernorLayer {
			config: limits.default.clone(),
		});
	}

	router
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(TraceLayer::new_for_http())
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}
