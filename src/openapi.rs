use std::borrow::Cow;

use aide::{
	openapi::{ApiKeyLocation, SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{error, extract::Json, session};

pub const SECURITY_SCHEME_SESSION: &str = "Session";
pub const SECURITY_SCHEME_API_KEY: &str = "API Key";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const COURTHOUSE: &str = "Courthouse";
	pub const SETTINGS: &str = "Settings";
	pub const VEHICLE: &str = "Vehicle";
	pub const VALUE: &str = "Value";
}

fn tag(name: &str, description: &str) -> Tag {
	Tag {
		name: name.into(),
		description: Some(description.into()),
		..Default::default()
	}
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Roleplay CAD")
		.summary("Community management for role-play servers")
		.description(include_str!("../README.md"))
		.tag(tag(tag::AUTH, "The authenticated user"))
		.tag(tag(tag::COURTHOUSE, "Courthouse board posts"))
		.tag(tag(tag::SETTINGS, "Deployment settings and feature flags"))
		.tag(tag(tag::VEHICLE, "Vehicle registration"))
		.tag(tag(tag::VALUE, "Reference values such as addresses"))
		.security_scheme(
			SECURITY_SCHEME_API_KEY,
			SecurityScheme::Http {
				scheme: "bearer".into(),
				bearer_format: Some("uuid".into()),
				description: Some("An API key sent as `Authorization: Bearer <key>`".into()),
				extensions: Default::default(),
			},
		)
		.security_scheme(
			SECURITY_SCHEME_SESSION,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Cookie,
				name: session::COOKIE_NAME.into(),
				description: Some("A user session cookie".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::ErrorBody>, _>(|res| {
			res.example(error::ErrorBody {
				success: false,
				errors: vec![error::Message {
					content: "error message".into(),
					field: Some("optional field".into()),
					details: Some(Cow::Owned({
						let mut map = error::Map::new();
						map.insert("key".into(), serde_json::json!("value"));
						map
					})),
				}],
			})
		})
}
