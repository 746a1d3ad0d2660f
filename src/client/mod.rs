//! The administrative client.
//!
//! Components hold their own state and talk to the server through a
//! [`ClientContext`], which also owns everything shared for the lifetime of
//! a client session: settings, reference values, modals and notifications.

pub mod fetch;
pub mod form;
pub mod modal;
pub mod select;
pub mod settings;
pub mod shared;
pub mod toast;
pub mod transfer;
pub mod transport;
pub mod values;

use std::sync::Arc;

use axum::http::StatusCode;
use tokio::sync::mpsc;

use crate::{error::Message, route::settings::model::Settings};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("transport error: {0}")]
	Transport(#[from] reqwest::Error),
	#[error("invalid url: {0}")]
	Url(#[from] url::ParseError),
	#[error("invalid json: {0}")]
	Json(#[from] serde_json::Error),
	#[error("request failed with status {}", .0.status)]
	Api(ApiError),
	#[error("the form has invalid fields")]
	Invalid,
}

/// A failed response from the server.
#[derive(Debug, Clone)]
pub struct ApiError {
	pub status: StatusCode,
	pub messages: Vec<Message<'static>>,
}

impl ApiError {
	/// The first message meant for the whole request rather than a field.
	pub fn general_message(&self) -> Option<&str> {
		self.messages
			.iter()
			.find(|message| message.field.is_none())
			.or_else(|| self.messages.first())
			.map(|message| message.content.as_ref())
	}
}

/// Everything a client session shares between components.
pub struct ClientContext {
	pub transport: Arc<dyn transport::Transport>,
	pub toasts: toast::Toasts,
	pub modals: modal::Modals,
	/// The current deployment settings, once loaded.
	pub settings: shared::Shared<Option<Settings>>,
	pub values: values::ValueCache,
}

impl ClientContext {
	/// Returns the context and the receiving end of its notifications.
	pub fn new(transport: Arc<dyn transport::Transport>) -> (Self, mpsc::UnboundedReceiver<toast::Toast>) {
		let (toasts, receiver) = toast::Toasts::channel();

		(
			Self {
				values: values::ValueCache::new(transport.clone()),
				transport,
				toasts,
				modals: modal::Modals::default(),
				settings: shared::Shared::new(None),
			},
			receiver,
		)
	}

	/// A fresh fetch hook bound to this session.
	pub fn fetch(&self) -> fetch::Fetch {
		fetch::Fetch::new(self.transport.clone(), self.toasts.clone())
	}
}
