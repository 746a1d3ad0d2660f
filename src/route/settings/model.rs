use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::feature::Feature;

/// The deployment-wide configuration. There is exactly one.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
	#[readonly]
	pub id: Uuid,
	/// The display name of the community.
	#[validate(length(min = 1, max = 255))]
	pub name: String,
	/// The area of play announced to members.
	#[serde(default)]
	#[validate(length(max = 255))]
	pub area_of_play: Option<String>,
	/// A Steam Web API key used for account linking.
	#[serde(default)]
	#[validate(length(max = 255))]
	pub steam_api_key: Option<String>,
	/// New accounts require approval before they can log in.
	pub whitelisted: bool,
	pub tow_whitelisted: bool,
	pub taxi_whitelisted: bool,
	pub business_whitelisted: bool,
	/// A code required to register a new account.
	#[serde(default)]
	#[validate(length(max = 255))]
	pub registration_code: Option<String>,
	pub roleplay_enabled: bool,
	/// The uploaded logo, set through the image endpoint.
	#[readonly]
	pub logo_id: Option<String>,
	#[readonly]
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl SettingsInput {
	/// Empty optional strings are stored as absent.
	#[must_use]
	pub fn normalized(mut self) -> Self {
		for field in [
			&mut self.area_of_play,
			&mut self.steam_api_key,
			&mut self.registration_code,
		] {
			if field.as_deref().is_some_and(|value| value.trim().is_empty()) {
				*field = None;
			}
		}

		self
	}
}

/// Whether a single feature is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeatureState {
	pub feature: Feature,
	pub is_enabled: bool,
}
