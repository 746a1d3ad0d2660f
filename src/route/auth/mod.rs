use aide::axum::{routing::get_with, ApiRouter};

use crate::AppState;

pub mod model;
pub mod route;

/// An error that can occur while resolving the authenticated user.
///
/// Sessions and API keys are issued elsewhere; this service only resolves them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("no session cookie or api key")]
	NoSessionCookieOrApiKey,
	#[error("invalid session cookie")]
	InvalidSessionCookie,
	#[error("invalid api key")]
	InvalidApiKey,
}

impl Error {
	/// The machine-readable code sent to the client.
	pub fn code(&self) -> &'static str {
		match self {
			Self::NoSessionCookieOrApiKey => "not_authenticated",
			Self::InvalidSessionCookie => "invalid_session",
			Self::InvalidApiKey => "invalid_api_key",
		}
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/me", get_with(get_me, get_me_docs))
}
