use std::str::FromStr;

use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};

use uuid::Uuid;

use crate::{
	error::RouteError,
	openapi::{SECURITY_SCHEME_API_KEY, SECURITY_SCHEME_SESSION},
	route::auth,
	session,
	store::Store,
	Database,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// A session or API key.
///
/// When fetching a user through cookie authentication,
/// this will be a [`SessionOrApiKey::Session`].
///
/// When fetching a user through API key authentication,
/// this will be a [`SessionOrApiKey::ApiKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrApiKey {
	Session(Uuid),
	ApiKey(Uuid),
}

/// Extracts the session and related user from the request.
///
/// If neither a session cookie nor an API key is sent, a
/// [`auth::Error::NoSessionCookieOrApiKey`] is returned.
/// If the session is invalid, a [`auth::Error::InvalidSessionCookie`] is returned.
///
/// ```ignore
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: SessionOrApiKey,
	pub user: auth::model::User,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError;

	/// Extracts the session from the request using a session cookie or API key.
	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let api_key = parts.headers.get(header::AUTHORIZATION);

		Ok(if let Some(api_key) = api_key {
			let api_key = api_key
				.to_str()
				.ok()
				.and_then(|value| value.strip_prefix(AUTHORIZATION_PREFIX))
				.and_then(|value| Uuid::from_str(value).ok())
				.ok_or(auth::Error::InvalidApiKey)?;

			let database = Database::from_ref(state);
			let user = database
				.user_by_api_key(api_key)
				.await?
				.ok_or(auth::Error::InvalidApiKey)?;

			Session {
				user,
				id: SessionOrApiKey::ApiKey(api_key),
			}
		} else {
			let cookies = parts
				.headers
				.get_all(header::COOKIE)
				.into_iter()
				.filter_map(|value| value.to_str().ok());

			let session_id = cookies
				.flat_map(cookie::Cookie::split_parse)
				.filter_map(Result::ok)
				.find(|cookie| cookie.name() == session::COOKIE_NAME)
				.ok_or(auth::Error::NoSessionCookieOrApiKey)?;

			let session_id = Uuid::parse_str(session_id.value())
				.map_err(|_| auth::Error::InvalidSessionCookie)?;

			let database = Database::from_ref(state);
			let user = database
				.user_by_session(session_id)
				.await?
				.ok_or(auth::Error::InvalidSessionCookie)?;

			Session {
				user,
				id: SessionOrApiKey::Session(session_id),
			}
		})
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a session cookie or API key requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.extend([
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
			[(SECURITY_SCHEME_API_KEY.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		]);
	}
}
