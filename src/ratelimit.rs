use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
	body::Body,
	response::{IntoResponse, Response},
};
use governor::{
	clock::QuantaInstant,
	middleware::{RateLimitingMiddleware, StateInformationMiddleware},
};
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::{KeyExtractor, PeerIpKeyExtractor},
	GovernorError,
};

use crate::error::RouteError;

pub type Config = Arc<GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>>;

/// How often stale limiter entries are dropped.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Per-IP limits for the served application.
///
/// Limiting keys on the peer address, so the service must be served with
/// connect info.
#[derive(Clone)]
pub struct Limits {
	/// Applied to every route.
	pub default: Config,
	/// Applied to expensive routes such as uploads.
	pub secure: Config,
}

impl Limits {
	/// Returns `None` if a configured quota is invalid.
	pub fn new() -> Option<Self> {
		Some(Self {
			default: Arc::new(
				GovernorConfigBuilder::default()
					.per_second(10)
					.burst_size(50)
					.use_headers()
					.error_handler(error_handler)
					.finish()?,
			),
			secure: Arc::new(
				GovernorConfigBuilder::default()
					.per_second(1)
					.use_headers()
					.error_handler(error_handler)
					.finish()?,
			),
		})
	}

	/// Periodically drops limiter entries that no longer limit anything.
	pub fn spawn_cleanup(&self) {
		cleanup_old_limits(&[&self.default, &self.secure]);
	}
}

fn error_handler(error: GovernorError) -> Response<Body> {
	RouteError::<Infallible>::from(error).into_response()
}

fn cleanup_old_limits<T, M>(configs: &[&Arc<GovernorConfig<T, M>>])
where
	T: KeyExtractor,
	<T as KeyExtractor>::Key: Send + Sync + 'static,
	M: RateLimitingMiddleware<QuantaInstant> + Send + Sync + 'static,
{
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();

	std::thread::spawn(move || loop {
		std::thread::sleep(CLEANUP_INTERVAL);

		for limiter in &limiters {
			tracing::debug!("rate limiting storage size: {}", limiter.len());

			limiter.retain_recent();
		}
	});
}
