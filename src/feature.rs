//! Deployment-level feature flags and the middleware that gates routers on them.

use std::{convert::Infallible, fmt, str::FromStr};

use axum::{extract::Request, middleware::Next, response::IntoResponse, response::Response};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{error::RouteError, permission::ParseError, store::Store, Database};

/// A feature that can be turned off for the whole deployment.
///
/// Features are enabled unless explicitly disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
	Courthouse,
	Aop,
	Tow,
	Taxi,
	Business,
}

impl Feature {
	pub const ALL: [Self; 5] = [
		Self::Courthouse,
		Self::Aop,
		Self::Tow,
		Self::Taxi,
		Self::Business,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Courthouse => "COURTHOUSE",
			Self::Aop => "AOP",
			Self::Tow => "TOW",
			Self::Taxi => "TAXI",
			Self::Business => "BUSINESS",
		}
	}
}

impl fmt::Display for Feature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Feature {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|feature| feature.as_str() == s)
			.ok_or_else(|| ParseError::new("feature", s))
	}
}

/// Runs the rest of the stack only if `feature` is enabled.
///
/// ```ignore
/// router.layer(middleware::from_fn_with_state(
///   state,
///   |State(database): State<Database>, request: Request, next: Next| {
///     feature::gate(Feature::Courthouse, database, request, next)
///   },
/// ))
/// ```
pub async fn gate(feature: Feature, database: Database, request: Request, next: Next) -> Response {
	match database.feature_enabled(feature).await {
		Ok(true) => next.run(request).await,
		Ok(false) => RouteError::<Infallible>::FeatureDisabled(feature).into_response(),
		Err(error) => RouteError::<Infallible>::Store(error).into_response(),
	}
}
