use axum::extract::State;
use macros::route;

use crate::{
	extract::{ImageUpload, Json, Session},
	openapi::tag,
	store::Store,
	AppState, Database,
};

use super::{model, RouteError, GUARD};

/// Get settings
/// Returns the deployment settings, including secrets such as the registration code.
#[route(tag = tag::SETTINGS, error = 401, error = 403)]
pub async fn get_settings(
	State(database): State<Database>,
	session: Session,
) -> Result<Json<model::Settings>, RouteError> {
	GUARD.authorize(&session.user)?;

	Ok(Json(database.settings().await?))
}

/// Update settings
/// Replaces every field of the deployment settings. The logo is changed through the image endpoint.
#[route(tag = tag::SETTINGS, error = 400, error = 401, error = 403)]
#[tracing::instrument(skip_all, fields(user = %session.user.id))]
pub async fn update_settings(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::SettingsInput>,
) -> Result<Json<model::Settings>, RouteError> {
	GUARD.authorize(&session.user)?;

	let settings = database.update_settings(&input.normalized()).await?;

	tracing::info!("updated settings");

	Ok(Json(settings))
}

/// Upload logo
/// Stores a new logo image (PNG, JPEG, GIF or WebP, at most 2 MiB) sent as the multipart field `image`.
#[route(tag = tag::SETTINGS, error = 400, error = 401, error = 403, error = 429)]
#[tracing::instrument(skip_all, fields(user = %session.user.id))]
pub async fn upload_logo(
	State(state): State<AppState>,
	session: Session,
	upload: ImageUpload,
) -> Result<Json<model::Settings>, RouteError> {
	GUARD.authorize(&session.user)?;

	let image = upload.image().await?;

	let previous = state.database.settings().await?.logo_id;
	let logo_id = state.uploads.save(&image).await?;
	let settings = state.database.set_logo(&logo_id).await?;

	if let Some(previous) = previous {
		if let Err(error) = state.uploads.remove(&previous).await {
			tracing::warn!(%error, logo = %previous, "failed to remove previous logo");
		}
	}

	tracing::info!(logo = %logo_id, size = image.bytes.len(), "uploaded logo");

	Ok(Json(settings))
}

/// Toggle feature
/// Enables or disables a feature for the whole deployment, returning the state of every feature.
#[route(tag = tag::SETTINGS, error = 400, error = 401, error = 403)]
#[tracing::instrument(skip_all, fields(user = %session.user.id, feature = %input.feature))]
pub async fn update_feature(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::FeatureState>,
) -> Result<Json<Vec<model::FeatureState>>, RouteError> {
	GUARD.authorize(&session.user)?;

	database.set_feature(input.feature, input.is_enabled).await?;

	Ok(Json(database.features().await?))
}
