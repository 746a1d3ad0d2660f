//! The general settings form.

use std::sync::Arc;

use axum::http::Method;

use super::{
	form::FormState,
	transport::{Part, Request},
	ClientContext, Error,
};
use crate::{
	extract::image,
	route::settings::model::{Settings, SettingsInput},
	upload,
};

/// A logo picked by the user.
#[derive(Debug, Clone)]
pub struct LogoFile {
	pub file_name: String,
	pub content_type: String,
	pub bytes: Vec<u8>,
}

/// Edits the deployment settings and, optionally, uploads a new logo.
pub struct GeneralSettingsForm {
	pub form: FormState<SettingsInput>,
	logo: Option<LogoFile>,
}

fn initial_values(settings: Option<&Settings>) -> SettingsInput {
	match settings {
		Some(settings) => SettingsInput {
			name: settings.name.clone(),
			area_of_play: settings.area_of_play.clone(),
			steam_api_key: settings.steam_api_key.clone(),
			whitelisted: settings.whitelisted,
			tow_whitelisted: settings.tow_whitelisted,
			taxi_whitelisted: settings.taxi_whitelisted,
			business_whitelisted: settings.business_whitelisted,
			registration_code: settings.registration_code.clone(),
			roleplay_enabled: settings.roleplay_enabled,
		},
		None => SettingsInput {
			name: String::new(),
			area_of_play: None,
			steam_api_key: None,
			whitelisted: false,
			tow_whitelisted: false,
			taxi_whitelisted: false,
			business_whitelisted: false,
			registration_code: None,
			roleplay_enabled: true,
		},
	}
}

impl GeneralSettingsForm {
	pub fn new(settings: Option<&Settings>) -> Self {
		Self {
			form: FormState::new(initial_values(settings)),
			logo: None,
		}
	}

	pub fn logo(&self) -> Option<&LogoFile> {
		self.logo.as_ref()
	}

	/// Picks a new logo. An unsupported file is refused with an error on the
	/// `image` field, and nothing will be uploaded.
	pub fn select_logo(&mut self, file: LogoFile) -> bool {
		use super::form::FieldErrors;

		match upload::check(&file.content_type, file.bytes.len()) {
			Ok(..) => {
				self.form.clear_error(image::FIELD);
				self.logo = Some(file);
				true
			}
			Err(code) => {
				self.form.set_error(image::FIELD, code);
				self.logo = None;
				false
			}
		}
	}

	/// Saves the settings, then uploads the picked logo.
	///
	/// The logo is only sent once the settings were saved. A failed upload
	/// does not undo the saved settings, which are still merged into the
	/// shared settings without a new logo. The logo stays picked until it
	/// was uploaded, so the next submit tries again.
	pub async fn submit(&mut self, context: &ClientContext) -> Result<Arc<Option<Settings>>, Error> {
		if !self.form.validate() {
			return Err(Error::Invalid);
		}

		let mut fetch = context.fetch();
		let body = serde_json::to_value(self.form.values().clone().normalized())?;
		let mut settings = fetch
			.execute_with(
				Request::json(Method::PUT, "/admin/settings", body),
				Some(&mut self.form),
			)
			.await?;

		if let Some(logo) = self.logo.clone() {
			let part = Part {
				name: image::FIELD.into(),
				file_name: logo.file_name,
				content_type: logo.content_type,
				bytes: logo.bytes,
			};

			match fetch
				.execute(Request::multipart("/admin/settings/image", vec![part]))
				.await
			{
				Ok(uploaded) => {
					self.logo = None;

					if let (Some(settings), Some(logo_id)) =
						(settings.as_object_mut(), uploaded.get("logoId"))
					{
						settings.insert("logoId".into(), logo_id.clone());
					}
				}
				Err(error) => tracing::warn!(%error, "logo upload failed after saving settings"),
			}
		}

		context.toasts.success("Saved", "The settings were saved");

		context.settings.patch(&settings)
	}
}
