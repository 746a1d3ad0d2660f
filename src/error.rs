use std::{borrow::Cow, convert::Infallible};

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use axum_jsonschema::JsonSchemaRejection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tower_governor::GovernorError;

use crate::{feature::Feature, route::auth, store};

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message sent to the client.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Message<'a> {
	/// A machine-readable error code, e.g. `unknown_post`.
	pub content: Cow<'a, str>,
	/// The request field the error relates to, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional structured details.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody {
	pub success: bool,
	pub errors: Vec<Message<'static>>,
}

/// Describes how a route-specific error is presented to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;
	fn errors(&self) -> Vec<Message<'_>>;
}

impl ErrorShape for Infallible {
	fn status(&self) -> StatusCode {
		match *self {}
	}

	fn errors(&self) -> Vec<Message<'_>> {
		match *self {}
	}
}

/// Error type for the application.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum RouteError<E = Infallible> {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error")]
	Json(JsonSchemaRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("multipart error: {0}")]
	Multipart(#[from] axum::extract::multipart::MultipartRejection),
	#[error("multipart field error: {0}")]
	MultipartField(#[from] axum::extract::multipart::MultipartError),
	#[error("invalid upload: {0}")]
	Upload(&'static str),
	#[error("auth error: {0}")]
	Auth(#[from] auth::Error),
	#[error("missing permission")]
	Forbidden,
	#[error("feature {0} is disabled")]
	FeatureDisabled(Feature),
	#[error("rate limited")]
	RateLimited(GovernorError),
	#[error("store error: {0}")]
	Store(#[from] store::Error),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("{0}")]
	Route(E),
}

impl<E> From<JsonSchemaRejection> for RouteError<E> {
	fn from(error: JsonSchemaRejection) -> Self {
		Self::Json(error)
	}
}

impl<E> From<sqlx::Error> for RouteError<E> {
	fn from(error: sqlx::Error) -> Self {
		Self::Store(error.into())
	}
}

impl From<GovernorError> for RouteError {
	fn from(error: GovernorError) -> Self {
		Self::RateLimited(error)
	}
}

fn validation_messages(errors: &validator::ValidationErrors) -> Vec<Message<'static>> {
	errors
		.field_errors()
		.into_iter()
		.flat_map(|(field, errors)| {
			errors.iter().map(move |error| {
				let mut message = Message::new(error.code.to_string()).field(field.to_string());

				for (key, value) in &error.params {
					// `value` repeats the rejected input, which may be a secret
					if key != "value" {
						message = message.detail(key, value.clone());
					}
				}

				message
			})
		})
		.collect()
}

/// Converts a camelCase wire property to the snake_case field name used by validation.
fn snake_case(property: &str) -> String {
	let mut output = String::with_capacity(property.len() + 4);

	for c in property.chars() {
		if c.is_ascii_uppercase() {
			output.push('_');
			output.push(c.to_ascii_lowercase());
		} else {
			output.push(c);
		}
	}

	output
}

/// The top-level property of a JSON pointer such as `/descriptionData/0`.
fn pointer_property(pointer: &str) -> Option<String> {
	pointer
		.split('/')
		.find(|segment| !segment.is_empty())
		.map(|segment| segment.replace("~1", "/").replace("~0", "~"))
}

/// Maps one schema output unit to a message on the property it concerns.
///
/// A missing property is reported at the parent object, so its name is read
/// from the error text (`"title" is a required property`).
fn schema_message(unit: &serde_json::Value) -> Option<(String, String)> {
	let keyword = unit["keywordLocation"].as_str()?.rsplit('/').next()?;
	let property = unit["instanceLocation"]
		.as_str()
		.and_then(pointer_property)
		.or_else(|| {
			let error = unit["error"].as_str()?;

			(keyword == "required")
				.then(|| error.split('"').nth(1))
				.flatten()
				.map(str::to_owned)
		})?;

	Some((snake_case(&property), keyword.to_owned()))
}

fn json_messages(rejection: &JsonSchemaRejection) -> Vec<Message<'static>> {
	let mut fields = Vec::<(String, String)>::new();

	if let JsonSchemaRejection::Schema(units) = rejection {
		let units = serde_json::to_value(units).unwrap_or_default();

		for unit in units.as_array().into_iter().flatten() {
			if let Some(message) = schema_message(unit) {
				if !fields.contains(&message) {
					fields.push(message);
				}
			}
		}
	} else if let JsonSchemaRejection::Serde(error) = rejection {
		let path = error.path().to_string();
		let property = path.split(['.', '[']).next().unwrap_or_default();

		if !property.is_empty() && property != "?" {
			fields.push((snake_case(property), "invalid_value".to_owned()));
		}
	}

	if fields.is_empty() {
		return Message::new("invalid_body").into_vec();
	}

	fields
		.into_iter()
		.map(|(field, content)| Message::new(content).field(field))
		.collect()
}

impl<E> RouteError<E>
where
	E: ErrorShape,
{
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..)
			| Self::Json(..)
			| Self::Path(..)
			| Self::Query(..)
			| Self::Multipart(..)
			| Self::MultipartField(..)
			| Self::Upload(..) => StatusCode::BAD_REQUEST,
			Self::Auth(..) => StatusCode::UNAUTHORIZED,
			Self::Forbidden => StatusCode::FORBIDDEN,
			Self::FeatureDisabled(..) => StatusCode::NOT_FOUND,
			Self::RateLimited(..) => StatusCode::TOO_MANY_REQUESTS,
			Self::Store(..) | Self::Io(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::Route(e) => e.status(),
		}
	}

	fn errors(&self) -> Vec<Message<'static>> {
		match self {
			Self::Validation(errors) => validation_messages(errors),
			Self::Json(rejection) => json_messages(rejection),
			Self::Path(error) => Message::new("invalid_path")
				.detail("error", error.body_text())
				.into_vec(),
			Self::Query(error) => Message::new("invalid_query")
				.detail("error", error.body_text())
				.into_vec(),
			Self::Multipart(..) | Self::MultipartField(..) => {
				Message::new("invalid_multipart").into_vec()
			}
			Self::Upload(reason) => Message::new(*reason).field("image").into_vec(),
			Self::Auth(error) => Message::new(error.code()).into_vec(),
			Self::Forbidden => Message::new("missing_permission").into_vec(),
			Self::FeatureDisabled(feature) => Message::new("feature_disabled")
				.detail("feature", feature.to_string())
				.into_vec(),
			Self::RateLimited(..) => Message::new("rate_limited").into_vec(),
			// Internal errors are logged, not shown
			Self::Store(..) | Self::Io(..) => Vec::new(),
			Self::Route(error) => error
				.errors()
				.into_iter()
				.map(|message| Message {
					content: Cow::Owned(message.content.into_owned()),
					field: message.field.map(|f| Cow::Owned(f.into_owned())),
					details: message.details.map(|d| Cow::Owned(d.into_owned())),
				})
				.collect(),
		}
	}
}

impl<E> IntoResponse for RouteError<E>
where
	E: ErrorShape,
{
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		} else {
			tracing::debug!(error = %self, "request rejected");
		}

		(
			status,
			Json(ErrorBody {
				success: false,
				errors: self.errors(),
			}),
		)
			.into_response()
	}
}

impl<E> OperationOutput for RouteError<E> {
	type Inner = Self;
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::*;

	#[derive(Validate)]
	struct Input {
		#[validate(length(min = 1))]
		title: String,
	}

	#[test]
	fn test_validation_errors_are_reported_per_field() {
		let errors = Input {
			title: String::new(),
		}
		.validate()
		.unwrap_err();

		let error = RouteError::<Infallible>::Validation(errors);

		assert_eq!(error.status(), StatusCode::BAD_REQUEST);

		let messages = error.errors();

		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].field.as_deref(), Some("title"));
		assert_eq!(messages[0].content, "length");
		assert!(messages[0]
			.details
			.as_ref()
			.is_some_and(|details| !details.contains_key("value")));
	}

	#[test]
	fn test_internal_errors_hide_details() {
		let error = RouteError::<Infallible>::Io(std::io::Error::other("disk on fire"));

		assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert!(error.errors().is_empty());
	}

	#[test]
	fn test_schema_errors_name_the_property() {
		let required = serde_json::json!({
			"keywordLocation": "/required",
			"instanceLocation": "",
			"error": "\"descriptionData\" is a required property",
		});
		let typed = serde_json::json!({
			"keywordLocation": "/properties/title/type",
			"instanceLocation": "/title",
			"error": "1 is not of type \"string\"",
		});
		let root = serde_json::json!({
			"keywordLocation": "/type",
			"instanceLocation": "",
			"error": "[] is not of type \"object\"",
		});

		assert_eq!(
			schema_message(&required),
			Some(("description_data".to_owned(), "required".to_owned()))
		);
		assert_eq!(
			schema_message(&typed),
			Some(("title".to_owned(), "type".to_owned()))
		);
		assert_eq!(schema_message(&root), None);
	}

	#[test]
	fn test_message_builder() {
		let message = Message::new("unknown_post")
			.field("id")
			.detail("post", "abc");

		assert_eq!(message.content, "unknown_post");
		assert_eq!(message.field.as_deref(), Some("id"));
		assert_eq!(
			message.details.unwrap().get("post"),
			Some(&serde_json::json!("abc"))
		);
	}
}
