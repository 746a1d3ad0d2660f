//! A form field that picks a value through a server-side search.

use serde::{de::DeserializeOwned, Serialize};
use url::form_urlencoded;
use validator::Validate;

use super::{
	fetch,
	form::FormState,
	transport::{Request, Transport},
	values::ValueCache,
	Error,
};
use crate::route::value::model::{Value, ValueType};

/// A change reported by the suggestion menu.
#[derive(Debug, Clone)]
pub enum Suggestion {
	/// An item was picked.
	Selected(Value),
	/// Text was typed without picking an item.
	Input(String),
	/// The input was emptied.
	Cleared,
	/// The menu closed with neither an item nor text.
	Closed,
}

pub type OnSuggestion = Box<dyn FnMut(Option<&Value>) + Send>;

/// Binds a form field to the id of a value while tracking the text shown
/// in the input separately.
pub struct ValueSelectField {
	kind: ValueType,
	name: String,
	display: String,
	on_suggestion: Option<OnSuggestion>,
}

impl ValueSelectField {
	/// A field storing the id of a `kind` value in the form field `name`.
	pub fn new(kind: ValueType, name: impl Into<String>) -> Self {
		Self {
			kind,
			name: name.into(),
			display: String::new(),
			on_suggestion: None,
		}
	}

	/// Called with the picked item, or `None` when the selection is dropped.
	#[must_use]
	pub fn on_suggestion(mut self, callback: impl FnMut(Option<&Value>) + Send + 'static) -> Self {
		self.on_suggestion = Some(Box::new(callback));
		self
	}

	/// The text shown in the input.
	pub fn display(&self) -> &str {
		&self.display
	}

	/// Loads the address values every select depends on and the values of
	/// this field's type, then shows the label of the value the form already
	/// holds. An id matching no value shows as empty text.
	pub async fn mount<V>(&mut self, values: &ValueCache, form: &FormState<V>) -> Result<(), Error>
	where
		V: Validate + Serialize + DeserializeOwned,
	{
		values.ensure_loaded(ValueType::Address).await?;

		let items = values.ensure_loaded(self.kind).await?;
		let current = form.field(&self.name)?;

		self.display = current
			.as_str()
			.and_then(|id| items.iter().find(|value| value.id.to_string() == id))
			.map(|value| value.value.clone())
			.unwrap_or_default();

		Ok(())
	}

	pub fn on_change<V>(&mut self, form: &mut FormState<V>, suggestion: Suggestion) -> Result<(), Error>
	where
		V: Validate + Serialize + DeserializeOwned,
	{
		let item = match suggestion {
			Suggestion::Selected(item) => {
				form.set_field(&self.name, serde_json::json!(item.id))?;
				self.display.clone_from(&item.value);
				Some(item)
			}
			Suggestion::Input(text) => {
				form.set_field(&self.name, serde_json::Value::Null)?;
				self.display = text;
				None
			}
			Suggestion::Cleared => {
				form.set_field(&self.name, serde_json::Value::Null)?;
				self.display.clear();
				None
			}
			// Keeps the shown text when the menu closes on its own
			Suggestion::Closed => return Ok(()),
		};

		if let Some(callback) = &mut self.on_suggestion {
			callback(item.as_ref());
		}

		Ok(())
	}

	/// Searches the values of this field's type. Empty text is a valid query.
	pub async fn search(&self, transport: &dyn Transport, text: &str) -> Result<Vec<Value>, Error> {
		let query = form_urlencoded::Serializer::new(String::new())
			.append_pair("query", text)
			.finish();
		let response = transport
			.send(Request::get(format!(
				"/admin/values/{}/search?{query}",
				self.kind.path()
			)))
			.await?;

		Ok(serde_json::from_value(fetch::decode(response)?)?)
	}
}
