use macros::route;

use crate::{
	extract::{Json, Session},
	openapi::tag,
};

use super::model;

/// Get user
/// Returns the authenticated user, including their rank and permissions.
#[route(tag = tag::AUTH, error = 401)]
pub async fn get_me(session: Session) -> Json<model::User> {
	Json(session.user)
}
