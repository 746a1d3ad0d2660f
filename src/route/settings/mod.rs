use aide::axum::{
	routing::{get_with, post_with, put_with},
	ApiRouter,
};
use axum::extract::DefaultBodyLimit;
use tower_governor::GovernorLayer;

use crate::{
	error,
	permission::{self, Guard, Permission},
	ratelimit, upload, AppState,
};

pub mod model;
pub mod route;

/// Settings are managed by the owner, or by anyone granted the explicit permission.
pub const GUARD: Guard = Guard::new(&[Permission::ManageCadSettings], permission::is_owner);

pub type RouteError = error::RouteError;

pub fn routes(limits: Option<&ratelimit::Limits>) -> ApiRouter<AppState> {
	use route::*;

	let mut image = ApiRouter::new()
		.api_route("/image", post_with(upload_logo, upload_logo_docs))
		.layer(DefaultBodyLimit::max(upload::MAX_REQUEST_SIZE));

	if let Some(limits) = limits {
		image = image.layer(GovernorLayer {
			config: limits.secure.clone(),
		});
	}

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_settings, get_settings_docs).put_with(update_settings, update_settings_docs),
		)
		.api_route("/features", put_with(update_feature, update_feature_docs))
		.merge(image)
}
