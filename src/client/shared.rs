//! Session-wide state that components patch with server responses.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use super::Error;

/// Shallow-merges `patch` over `previous`.
///
/// Top-level keys of `patch` replace those of `previous` and absent keys keep
/// their previous value. Anything that is not an object is replaced outright.
pub fn merge(previous: &Value, patch: &Value) -> Value {
	match (previous, patch) {
		(Value::Object(previous), Value::Object(patch)) => {
			let mut merged = previous.clone();

			for (key, value) in patch {
				merged.insert(key.clone(), value.clone());
			}

			Value::Object(merged)
		}
		_ => patch.clone(),
	}
}

/// A snapshot holder. Every change publishes a new snapshot to subscribers.
#[derive(Debug)]
pub struct Shared<T> {
	sender: Arc<watch::Sender<Arc<T>>>,
}

impl<T> Clone for Shared<T> {
	fn clone(&self) -> Self {
		Self {
			sender: self.sender.clone(),
		}
	}
}

impl<T> Shared<T>
where
	T: Serialize + DeserializeOwned,
{
	pub fn new(value: T) -> Self {
		let (sender, _) = watch::channel(Arc::new(value));

		Self {
			sender: Arc::new(sender),
		}
	}

	/// The current snapshot.
	pub fn get(&self) -> Arc<T> {
		self.sender.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<Arc<T>> {
		self.sender.subscribe()
	}

	pub fn set(&self, value: T) -> Arc<T> {
		let value = Arc::new(value);

		self.sender.send_replace(value.clone());
		value
	}

	/// Shallow-merges a server response into the current snapshot.
	pub fn patch(&self, response: &Value) -> Result<Arc<T>, Error> {
		let previous = serde_json::to_value(&*self.get())?;
		let next = serde_json::from_value(merge(&previous, response))?;

		Ok(self.set(next))
	}
}
