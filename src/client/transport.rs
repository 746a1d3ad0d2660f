//! How the client reaches the server.

use axum::{
	body::Bytes,
	http::{Method, StatusCode},
};
use reqwest::multipart;
use url::Url;
use uuid::Uuid;

use super::Error;
use crate::session;

/// A single file sent in a multipart body.
#[derive(Debug, Clone)]
pub struct Part {
	pub name: String,
	pub file_name: String,
	pub content_type: String,
	pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum Body {
	Empty,
	Json(serde_json::Value),
	Multipart(Vec<Part>),
}

#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	/// The path and query, relative to the server root.
	pub path: String,
	pub body: Body,
}

impl Request {
	pub fn get(path: impl Into<String>) -> Self {
		Self {
			method: Method::GET,
			path: path.into(),
			body: Body::Empty,
		}
	}

	pub fn json(method: Method, path: impl Into<String>, json: serde_json::Value) -> Self {
		Self {
			method,
			path: path.into(),
			body: Body::Json(json),
		}
	}

	pub fn multipart(path: impl Into<String>, parts: Vec<Part>) -> Self {
		Self {
			method: Method::POST,
			path: path.into(),
			body: Body::Multipart(parts),
		}
	}
}

#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub body: Bytes,
}

#[axum::async_trait]
pub trait Transport: Send + Sync {
	async fn send(&self, request: Request) -> Result<Response, Error>;
}

/// Talks to a server over HTTP, authenticated with a session cookie.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
	base: Url,
	session: Uuid,
}

impl HttpTransport {
	pub fn new(base: &str, session: Uuid) -> Result<Self, Error> {
		Ok(Self {
			client: reqwest::Client::new(),
			base: Url::parse(base)?,
			session,
		})
	}
}

#[axum::async_trait]
impl Transport for HttpTransport {
	#[tracing::instrument(skip_all, fields(method = %request.method, path = %request.path))]
	async fn send(&self, request: Request) -> Result<Response, Error> {
		let url = self.base.join(&request.path)?;
		let builder = self
			.client
			.request(request.method, url)
			.header(reqwest::header::COOKIE, session::header_value(self.session));

		let builder = match request.body {
			Body::Empty => builder,
			Body::Json(json) => builder.json(&json),
			Body::Multipart(parts) => {
				let mut form = multipart::Form::new();

				for part in parts {
					form = form.part(
						part.name,
						multipart::Part::bytes(part.bytes)
							.file_name(part.file_name)
							.mime_str(&part.content_type)?,
					);
				}

				builder.multipart(form)
			}
		};

		let response = builder.send().await?;
		let status = response.status();
		let body = response.bytes().await?;

		tracing::debug!(%status, "received response");

		Ok(Response { status, body })
	}
}
