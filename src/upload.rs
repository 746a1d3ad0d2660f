//! Storage of uploaded images in a local directory.

use std::{
	io,
	path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::extract::Image;

/// The largest accepted image.
pub const MAX_IMAGE_SIZE: usize = 2 * 1024 * 1024;
/// The largest accepted upload request, leaving room for multipart framing.
pub const MAX_REQUEST_SIZE: usize = MAX_IMAGE_SIZE + 64 * 1024;

/// Accepted image content types and the extension they are stored with.
pub const IMAGE_TYPES: [(&str, &str); 4] = [
	("image/png", "png"),
	("image/jpeg", "jpg"),
	("image/gif", "gif"),
	("image/webp", "webp"),
];

/// Checks an image before it is uploaded or stored, returning its extension.
///
/// The error is the code reported for the `image` field.
pub fn check(content_type: &str, size: usize) -> Result<&'static str, &'static str> {
	let extension = IMAGE_TYPES
		.iter()
		.find(|(kind, _)| *kind == content_type)
		.map(|(_, extension)| *extension)
		.ok_or("invalid_image_type")?;

	if size > MAX_IMAGE_SIZE {
		return Err("image_too_large");
	}

	Ok(extension)
}

/// A directory of uploaded files, addressed by generated ids.
#[derive(Debug, Clone)]
pub struct Uploads {
	root: PathBuf,
}

impl Uploads {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Resolves an id to its path, refusing ids that would leave the directory.
	pub fn path(&self, id: &str) -> io::Result<PathBuf> {
		if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
			return Err(io::Error::new(
				io::ErrorKind::InvalidInput,
				format!("invalid upload id {id:?}"),
			));
		}

		Ok(self.root.join(id))
	}

	/// Writes the image under a new id and returns the id.
	pub async fn save(&self, image: &Image) -> io::Result<String> {
		let id = format!("{}.{}", Uuid::new_v4(), image.extension);

		tokio::fs::create_dir_all(&self.root).await?;
		tokio::fs::write(self.path(&id)?, &image.bytes).await?;

		tracing::debug!(%id, "stored upload");

		Ok(id)
	}

	pub async fn remove(&self, id: &str) -> io::Result<()> {
		tokio::fs::remove_file(self.path(id)?).await
	}
}
