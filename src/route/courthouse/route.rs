use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Session},
	openapi::tag,
	store::Store,
	Database,
};

use super::{model, Error, RouteError, GUARD};

/// Get all posts
/// Returns every courthouse post, newest first, with the public profile of its author.
#[route(tag = tag::COURTHOUSE, error = 401, error = 404)]
#[tracing::instrument(skip_all)]
pub async fn get_posts(
	State(database): State<Database>,
	_session: Session,
) -> Result<Json<Vec<model::CourthousePost>>, RouteError> {
	let posts = database.list_courthouse_posts().await?;

	Ok(Json(posts))
}

/// Get single post
/// Returns a single courthouse post by its unique id.
#[route(tag = tag::COURTHOUSE, error = 401, error = 404)]
#[tracing::instrument(skip_all, fields(post = %path.id))]
pub async fn get_post(
	State(database): State<Database>,
	_session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::CourthousePost>, RouteError> {
	let post = database.find_courthouse_post(path.id).await?;

	Ok(Json(post.ok_or(Error::UnknownPost(path.id))?))
}

/// Create post
/// Creates a new courthouse post owned by the authenticated user.
/// Requires the `ManageCourthousePosts` permission or a rank above `USER`.
#[route(tag = tag::COURTHOUSE, error = 400, error = 401, error = 403, error = 404)]
#[tracing::instrument(skip_all, fields(user = %session.user.id))]
pub async fn create_post(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::CourthousePostInput>,
) -> Result<Json<model::CourthousePost>, RouteError> {
	GUARD.authorize(&session.user)?;

	let post = database
		.create_courthouse_post(session.user.id, &input)
		.await?;

	tracing::info!(post = %post.id, "created courthouse post");

	Ok(Json(post))
}

/// Update post
/// Replaces the title and body of an existing courthouse post. The author never changes.
/// Requires the `ManageCourthousePosts` permission or a rank above `USER`.
#[route(tag = tag::COURTHOUSE, error = 400, error = 401, error = 403, error = 404)]
#[tracing::instrument(skip_all, fields(user = %session.user.id, post = %path.id))]
pub async fn update_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::CourthousePostInput>,
) -> Result<Json<model::CourthousePost>, RouteError> {
	if database.find_courthouse_post(path.id).await?.is_none() {
		return Err(Error::UnknownPost(path.id).into());
	}

	GUARD.authorize(&session.user)?;

	let post = database.update_courthouse_post(path.id, &input).await?;

	Ok(Json(post.ok_or(Error::UnknownPost(path.id))?))
}

/// Delete post
/// Deletes an existing courthouse post by its unique id, returning `true`.
/// Requires the `ManageCourthousePosts` permission or a rank above `USER`.
#[route(tag = tag::COURTHOUSE, error = 401, error = 403, error = 404)]
#[tracing::instrument(skip_all, fields(user = %session.user.id, post = %path.id))]
pub async fn delete_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<bool>, RouteError> {
	if database.find_courthouse_post(path.id).await?.is_none() {
		return Err(Error::UnknownPost(path.id).into());
	}

	GUARD.authorize(&session.user)?;

	if !database.delete_courthouse_post(path.id).await? {
		return Err(Error::UnknownPost(path.id).into());
	}

	tracing::info!("deleted courthouse post");

	Ok(Json(true))
}
