//! Reference values loaded at most once per client session.

use std::sync::Arc;

use tokio::sync::OnceCell;

use super::{
	fetch,
	transport::{Request, Transport},
	Error,
};
use crate::route::value::model::{Value, ValueType};

/// The loaded values of every type.
///
/// Loading is idempotent: concurrent callers share a single request, and a
/// failed load is retried by the next caller.
pub struct ValueCache {
	transport: Arc<dyn Transport>,
	cells: [OnceCell<Arc<Vec<Value>>>; ValueType::ALL.len()],
}

impl ValueCache {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self {
			transport,
			cells: std::array::from_fn(|_| OnceCell::new()),
		}
	}

	fn cell(&self, kind: ValueType) -> &OnceCell<Arc<Vec<Value>>> {
		&self.cells[kind as usize]
	}

	/// The values of a type, if they were loaded.
	pub fn get(&self, kind: ValueType) -> Option<Arc<Vec<Value>>> {
		self.cell(kind).get().cloned()
	}

	pub async fn ensure_loaded(&self, kind: ValueType) -> Result<Arc<Vec<Value>>, Error> {
		self.cell(kind)
			.get_or_try_init(|| async {
				tracing::debug!(%kind, "loading values");

				let response = self
					.transport
					.send(Request::get(format!("/admin/values/{}", kind.path())))
					.await?;

				Ok::<_, Error>(Arc::new(serde_json::from_value(fetch::decode(response)?)?))
			})
			.await
			.cloned()
	}
}
