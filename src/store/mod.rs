//! Persistence behind a single trait.
//!
//! [`PgStore`] is used whenever a database is configured; [`MemoryStore`]
//! backs the test suite and local development without Postgres.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use uuid::Uuid;

use crate::{
	feature::Feature,
	route::{
		auth::model::User,
		courthouse::model::{CourthousePost, CourthousePostInput},
		settings::model::{FeatureState, Settings, SettingsInput},
		value::model::{Value, ValueType},
		vehicle::model::{Citizen, Vehicle},
	},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	/// A stored row could not be turned into a model.
	#[error("corrupt {table} row: {reason}")]
	Corrupt {
		table: &'static str,
		reason: String,
	},
	#[error("settings row is missing")]
	MissingSettings,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[axum::async_trait]
pub trait Store: Send + Sync {
	/// Resolves a session id to the user that owns it.
	async fn user_by_session(&self, session: Uuid) -> Result<Option<User>>;
	/// Resolves an API key to the user that owns it.
	async fn user_by_api_key(&self, key: Uuid) -> Result<Option<User>>;

	/// Every post, newest first.
	async fn list_courthouse_posts(&self) -> Result<Vec<CourthousePost>>;
	async fn find_courthouse_post(&self, id: Uuid) -> Result<Option<CourthousePost>>;
	async fn create_courthouse_post(
		&self,
		user_id: Uuid,
		input: &CourthousePostInput,
	) -> Result<CourthousePost>;
	/// Changes the title and body. Returns `None` if the post does not exist.
	async fn update_courthouse_post(
		&self,
		id: Uuid,
		input: &CourthousePostInput,
	) -> Result<Option<CourthousePost>>;
	/// Returns `false` if the post does not exist.
	async fn delete_courthouse_post(&self, id: Uuid) -> Result<bool>;

	async fn settings(&self) -> Result<Settings>;
	async fn update_settings(&self, input: &SettingsInput) -> Result<Settings>;
	async fn set_logo(&self, logo_id: &str) -> Result<Settings>;

	/// Features are enabled unless explicitly disabled.
	async fn feature_enabled(&self, feature: Feature) -> Result<bool>;
	async fn set_feature(&self, feature: Feature, enabled: bool) -> Result<()>;
	/// The state of every known feature.
	async fn features(&self) -> Result<Vec<FeatureState>> {
		let mut states = Vec::with_capacity(Feature::ALL.len());

		for feature in Feature::ALL {
			states.push(FeatureState {
				feature,
				is_enabled: self.feature_enabled(feature).await?,
			});
		}

		Ok(states)
	}

	async fn find_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>>;
	async fn find_citizen(&self, id: Uuid) -> Result<Option<Citizen>>;
	/// Hands a vehicle still held by `from` over to `owner` and the user that controls them.
	///
	/// Returns `None` when the vehicle is missing or no longer belongs to `from`.
	async fn transfer_vehicle(
		&self,
		id: Uuid,
		from: Uuid,
		owner: &Citizen,
	) -> Result<Option<Vehicle>>;

	/// Every value of a type, ordered by position and then by text.
	async fn list_values(&self, kind: ValueType) -> Result<Vec<Value>>;
	/// Values of a type containing `query`, ignoring case.
	async fn search_values(&self, kind: ValueType, query: &str, limit: usize)
		-> Result<Vec<Value>>;
}
