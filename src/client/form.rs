//! Form state bound to the same validation rules the server applies.

use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use super::{shared, Error};

/// Converts a field name as validated (`snake_case`) into its form name (`camelCase`).
pub fn field_name(name: &str) -> String {
	let mut output = String::with_capacity(name.len());
	let mut upper = false;

	for c in name.chars() {
		if c == '_' {
			upper = !output.is_empty();
		} else if upper {
			output.extend(c.to_uppercase());
			upper = false;
		} else {
			output.push(c);
		}
	}

	output
}

/// Anything that can show an error next to a field.
pub trait FieldErrors: Send {
	fn set_error(&mut self, field: &str, message: &str);
}

/// The values of a form and the error shown next to each field.
///
/// Errors are keyed by form name and hold the error code.
#[derive(Debug, Clone)]
pub struct FormState<V> {
	values: V,
	errors: BTreeMap<String, String>,
}

fn messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
	errors
		.field_errors()
		.into_iter()
		.filter_map(|(field, errors)| {
			errors
				.first()
				.map(|error| (field_name(&field), error.code.to_string()))
		})
		.collect()
}

impl<V> FormState<V>
where
	V: Validate + Serialize + DeserializeOwned,
{
	pub fn new(values: V) -> Self {
		Self {
			values,
			errors: BTreeMap::new(),
		}
	}

	pub fn values(&self) -> &V {
		&self.values
	}

	pub fn errors(&self) -> &BTreeMap<String, String> {
		&self.errors
	}

	pub fn error(&self, field: &str) -> Option<&str> {
		self.errors.get(field).map(String::as_str)
	}

	pub fn clear_error(&mut self, field: &str) {
		self.errors.remove(field);
	}

	pub fn to_json(&self) -> Result<Value, Error> {
		Ok(serde_json::to_value(&self.values)?)
	}

	/// The current value of a field, or null if it has none.
	pub fn field(&self, field: &str) -> Result<Value, Error> {
		Ok(self.to_json()?.get(field).cloned().unwrap_or(Value::Null))
	}

	/// Sets a single field, keeping every other value, and re-validates that field.
	pub fn set_field(&mut self, field: &str, value: Value) -> Result<(), Error> {
		let mut patch = serde_json::Map::new();
		patch.insert(field.to_owned(), value);

		let values = shared::merge(&self.to_json()?, &Value::Object(patch));

		self.values = serde_json::from_value(values)?;
		self.errors.remove(field);

		if let Err(errors) = self.values.validate() {
			if let Some(message) = messages(&errors).remove(field) {
				self.errors.insert(field.to_owned(), message);
			}
		}

		Ok(())
	}

	/// Validates every field, replacing all errors. Returns `true` if the form is valid.
	pub fn validate(&mut self) -> bool {
		self.errors = match self.values.validate() {
			Ok(()) => BTreeMap::new(),
			Err(errors) => messages(&errors),
		};

		self.errors.is_empty()
	}
}

impl<V> FieldErrors for FormState<V>
where
	V: Send,
{
	fn set_error(&mut self, field: &str, message: &str) {
		self.errors.insert(field.to_owned(), message.to_owned());
	}
}

#[cfg(test)]
mod test {
	use serde::Deserialize;
	use serde_json::json;

	use super::*;

	#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
	#[serde(rename_all = "camelCase")]
	struct Input {
		#[validate(length(min = 1))]
		display_name: String,
		#[validate(range(max = 10))]
		level: u8,
	}

	fn form() -> FormState<Input> {
		FormState::new(Input {
			display_name: "John".into(),
			level: 1,
		})
	}

	#[test]
	fn test_field_name() {
		assert_eq!(field_name("area_of_play"), "areaOfPlay");
		assert_eq!(field_name("name"), "name");
		assert_eq!(field_name("ownerId"), "ownerId");
		assert_eq!(field_name("_private"), "private");
	}

	#[test]
	fn test_set_field_keeps_other_values() {
		let mut form = form();

		form.set_field("level", json!(5)).unwrap();

		assert_eq!(form.values().level, 5);
		assert_eq!(form.values().display_name, "John");
		assert!(form.errors().is_empty());
	}

	#[test]
	fn test_set_field_validates_only_that_field() {
		let mut form = form();

		form.set_field("level", json!(50)).unwrap();

		assert_eq!(form.error("level"), Some("range"));
		assert_eq!(form.error("displayName"), None);

		form.set_field("level", json!(2)).unwrap();

		assert_eq!(form.error("level"), None);
	}

	#[test]
	fn test_set_field_rejects_wrong_type() {
		let mut form = form();

		assert!(form.set_field("level", json!("high")).is_err());
		assert_eq!(form.values().level, 1);
	}

	#[test]
	fn test_validate_reports_every_field() {
		let mut form = FormState::new(Input {
			display_name: String::new(),
			level: 11,
		});

		assert!(!form.validate());
		assert_eq!(form.error("displayName"), Some("length"));
		assert_eq!(form.error("level"), Some("range"));

		form.set_field("displayName", json!("Jane")).unwrap();
		form.set_field("level", json!(3)).unwrap();

		assert!(form.validate());
	}
}
