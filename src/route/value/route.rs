use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	store::Store,
	Database,
};

use super::{model, RouteError};

/// Get values
/// Returns every value of a type, ordered by position and then by text.
#[route(tag = tag::VALUE, error = 400, error = 401)]
pub async fn get_values(
	State(database): State<Database>,
	_session: Session,
	Path(path): Path<model::TypePath>,
) -> Result<Json<Vec<model::Value>>, RouteError> {
	Ok(Json(database.list_values(path.kind).await?))
}

/// Search values
/// Returns at most 35 values of a type whose text contains the query, ignoring case.
#[route(tag = tag::VALUE, error = 400, error = 401)]
#[tracing::instrument(skip_all, fields(kind = %path.kind))]
pub async fn search_values(
	State(database): State<Database>,
	_session: Session,
	Path(path): Path<model::TypePath>,
	Query(query): Query<model::SearchQuery>,
) -> Result<Json<Vec<model::Value>>, RouteError> {
	let values = database
		.search_values(path.kind, &query.query, model::SEARCH_LIMIT)
		.await?;

	Ok(Json(values))
}
