//! The request hook every component sends through.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::Value;

use super::{
	form::{self, FieldErrors},
	toast::Toasts,
	transport::{Request, Response, Transport},
	ApiError, Error,
};
use crate::error::ErrorBody;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
	#[default]
	Idle,
	Loading,
	Error,
}

/// Turns a response into its JSON body, or into an [`ApiError`].
pub fn decode(response: Response) -> Result<Value, Error> {
	if response.status.is_success() {
		if response.body.is_empty() {
			return Ok(Value::Null);
		}

		return Ok(serde_json::from_slice(&response.body)?);
	}

	let messages = serde_json::from_slice::<ErrorBody>(&response.body)
		.map(|body| body.errors)
		.unwrap_or_default();

	Err(Error::Api(ApiError {
		status: response.status,
		messages,
	}))
}

/// Sends requests and reports their failures.
///
/// Field errors of a rejected form are shown next to their fields when the
/// form is passed along; every other failure becomes an error notification.
/// Nothing is retried.
pub struct Fetch {
	transport: Arc<dyn Transport>,
	toasts: Toasts,
	state: FetchState,
}

impl Fetch {
	pub fn new(transport: Arc<dyn Transport>, toasts: Toasts) -> Self {
		Self {
			transport,
			toasts,
			state: FetchState::Idle,
		}
	}

	pub fn state(&self) -> FetchState {
		self.state
	}

	pub async fn execute(&mut self, request: Request) -> Result<Value, Error> {
		self.execute_with(request, None).await
	}

	pub async fn execute_with(
		&mut self,
		request: Request,
		form: Option<&mut dyn FieldErrors>,
	) -> Result<Value, Error> {
		self.state = FetchState::Loading;

		let result = self.transport.send(request).await.and_then(decode);

		self.state = match result {
			Ok(..) => FetchState::Idle,
			Err(ref error) => {
				self.report(error, form);
				FetchState::Error
			}
		};

		result
	}

	fn report(&self, error: &Error, form: Option<&mut dyn FieldErrors>) {
		let Error::Api(error) = error else {
			self.toasts.error("Error", error.to_string());
			return;
		};

		let fielded = error.status == StatusCode::BAD_REQUEST
			&& error.messages.iter().any(|message| message.field.is_some());

		match form {
			Some(form) if fielded => {
				for message in &error.messages {
					if let Some(field) = &message.field {
						form.set_error(&form::field_name(field), &message.content);
					}
				}
			}
			_ => self.toasts.error(
				error.status.canonical_reason().unwrap_or("Error"),
				error.general_message().unwrap_or("unknown_error"),
			),
		}
	}
}

#[cfg(test)]
mod test {
	use axum::http::Method;

	use super::*;
	use crate::{
		client::{form::FormState, toast::ToastKind},
		route::courthouse::model::CourthousePostInput,
		test::*,
	};

	#[tokio::test]
	async fn test_success_returns_json() {
		let fixture = Fixture::new().await;
		let (toasts, mut receiver) = Toasts::channel();
		let mut fetch = Fetch::new(fixture.transport(fixture.user_session), toasts);

		let json = fetch.execute(Request::get("/auth/me")).await.unwrap();

		assert_eq!(json["username"], "user");
		assert_eq!(fetch.state(), FetchState::Idle);
		assert!(receiver.try_recv().is_err());
	}

	#[tokio::test]
	async fn test_validation_errors_land_in_form() {
		let fixture = Fixture::new().await;
		let (toasts, mut receiver) = Toasts::channel();
		let mut fetch = Fetch::new(fixture.transport(fixture.admin_session), toasts);
		let mut form = FormState::new(CourthousePostInput {
			title: String::new(),
			description_data: json!([]),
		});

		let result = fetch
			.execute_with(
				Request::json(Method::POST, "/courthouse-posts", form.to_json().unwrap()),
				Some(&mut form),
			)
			.await;

		assert!(matches!(result, Err(Error::Api(ref error)) if error.status == StatusCode::BAD_REQUEST));
		assert_eq!(fetch.state(), FetchState::Error);
		assert_eq!(form.error("title"), Some("length"));
		assert_eq!(form.error("descriptionData"), Some("rich_text_empty"));
		assert!(receiver.try_recv().is_err());
	}

	#[tokio::test]
	async fn test_missing_property_lands_in_form() {
		let fixture = Fixture::new().await;
		let (toasts, mut receiver) = Toasts::channel();
		let mut fetch = Fetch::new(fixture.transport(fixture.admin_session), toasts);
		let mut form = FormState::new(CourthousePostInput {
			title: "Notice".into(),
			description_data: json!([]),
		});

		let result = fetch
			.execute_with(
				Request::json(Method::POST, "/courthouse-posts", json!({ "title": "Notice" })),
				Some(&mut form),
			)
			.await;

		assert!(result.is_err());
		assert_eq!(form.error("descriptionData"), Some("required"));
		assert!(receiver.try_recv().is_err());
	}

	#[tokio::test]
	async fn test_forbidden_becomes_notification() {
		let fixture = Fixture::new().await;
		let (toasts, mut receiver) = Toasts::channel();
		let mut fetch = Fetch::new(fixture.transport(fixture.user_session), toasts);
		let mut form = FormState::new(CourthousePostInput {
			title: "Notice".into(),
			description_data: json!([{ "type": "paragraph" }]),
		});

		let result = fetch
			.execute_with(
				Request::json(Method::POST, "/courthouse-posts", form.to_json().unwrap()),
				Some(&mut form),
			)
			.await;

		assert!(result.is_err());
		assert!(form.errors().is_empty());

		let toast = receiver.try_recv().unwrap();

		assert_eq!(toast.kind, ToastKind::Error);
		assert_eq!(toast.message, "missing_permission");
	}

	#[test]
	fn test_decode_tolerates_foreign_error_bodies() {
		let result = decode(Response {
			status: StatusCode::BAD_GATEWAY,
			body: "<html>".into(),
		});

		assert!(matches!(result, Err(Error::Api(ref error)) if error.messages.is_empty()));
	}
}
