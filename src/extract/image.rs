use aide::{
	gen::GenContext,
	openapi::{MediaType, Operation, ReferenceOr, RequestBody},
	OperationInput,
};
use axum::{
	body::Bytes,
	extract::{FromRequest, Multipart, Request},
};

use crate::{error::RouteError, upload};

/// The multipart field the image is read from.
pub const FIELD: &str = "image";

/// An image read from the multipart field `image`, with its type and size checked.
#[derive(Debug)]
pub struct Image {
	pub content_type: String,
	/// The file extension matching the content type, without a dot.
	pub extension: &'static str,
	pub file_name: Option<String>,
	pub bytes: Bytes,
}

/// A multipart upload whose `image` field has not been read yet.
///
/// The body is only consumed by [`ImageUpload::image`], so a handler can
/// authorize the caller before anything is buffered or checked.
pub struct ImageUpload(Multipart);

impl ImageUpload {
	/// Reads the `image` field and checks its content type and size.
	pub async fn image(mut self) -> Result<Image, RouteError> {
		while let Some(field) = self.0.next_field().await? {
			if field.name() != Some(FIELD) {
				continue;
			}

			let content_type = field.content_type().unwrap_or_default().to_owned();
			let file_name = field.file_name().map(str::to_owned);
			let bytes = field.bytes().await?;
			let extension =
				upload::check(&content_type, bytes.len()).map_err(RouteError::Upload)?;

			return Ok(Image {
				content_type,
				extension,
				file_name,
				bytes,
			});
		}

		Err(RouteError::Upload("missing_image"))
	}
}

#[axum::async_trait]
impl<S> FromRequest<S> for ImageUpload
where
	S: Send + Sync,
{
	type Rejection = RouteError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		Ok(Self(Multipart::from_request(req, state).await?))
	}
}

impl OperationInput for ImageUpload {
	fn operation_input(_ctx: &mut GenContext, operation: &mut Operation) {
		operation.request_body = Some(ReferenceOr::Item(RequestBody {
			description: Some(format!(
				"An image in the multipart field `{FIELD}`, at most {} bytes",
				upload::MAX_IMAGE_SIZE
			)),
			content: [("multipart/form-data".to_owned(), MediaType::default())]
				.into_iter()
				.collect(),
			required: true,
			..Default::default()
		}));
	}
}
