use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use super::{Error, Result, Store};
use crate::{
	feature::Feature,
	permission::{Permission, Rank},
	route::{
		auth::model::{User, UserProjection},
		courthouse::model::{CourthousePost, CourthousePostInput},
		settings::model::{Settings, SettingsInput},
		value::model::{Value, ValueType},
		vehicle::model::{Citizen, CitizenProjection, Vehicle},
	},
};

const POST_COLUMNS: &str = r#"
	post.id, post.title, post.description_data, post.user_id, post.created_at, post.updated_at,
	"user".username, "user".rank
"#;

const VEHICLE_COLUMNS: &str = r"
	vehicle.id, vehicle.plate, vehicle.model, vehicle.user_id, vehicle.citizen_id,
	vehicle.created_at, vehicle.updated_at, citizen.name, citizen.surname
";

const VALUE_COLUMNS: &str = "id, type, value, position, is_default, created_at";

fn corrupt(table: &'static str, error: impl std::fmt::Display) -> Error {
	Error::Corrupt {
		table,
		reason: error.to_string(),
	}
}

#[derive(FromRow)]
struct UserRow {
	id: Uuid,
	username: String,
	rank: String,
	permissions: Vec<String>,
	created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
	type Error = Error;

	fn try_from(row: UserRow) -> Result<Self> {
		Ok(Self {
			id: row.id,
			username: row.username,
			rank: row.rank.parse::<Rank>().map_err(|e| corrupt("user", e))?,
			permissions: row
				.permissions
				.iter()
				.map(|permission| permission.parse::<Permission>())
				.collect::<Result<Vec<_>, _>>()
				.map_err(|e| corrupt("user", e))?,
			created_at: row.created_at,
		})
	}
}

#[derive(FromRow)]
struct PostRow {
	id: Uuid,
	title: String,
	description_data: serde_json::Value,
	user_id: Uuid,
	created_at: DateTime<Utc>,
	updated_at: DateTime<Utc>,
	username: String,
	rank: String,
}

impl TryFrom<PostRow> for CourthousePost {
	type Error = Error;

	fn try_from(row: PostRow) -> Result<Self> {
		Ok(Self {
			id: row.id,
			title: row.title,
			description_data: row.description_data,
			user_id: row.user_id,
			user: UserProjection {
				id: row.user_id,
				username: row.username,
				rank: row.rank.parse::<Rank>().map_err(|e| corrupt("user", e))?,
			},
			created_at: row.created_at,
			updated_at: row.updated_at,
		})
	}
}

#[derive(FromRow)]
struct SettingsRow {
	id: Uuid,
	name: String,
	area_of_play: Option<String>,
	steam_api_key: Option<String>,
	whitelisted: bool,
	tow_whitelisted: bool,
	taxi_whitelisted: bool,
	business_whitelisted: bool,
	registration_code: Option<String>,
	roleplay_enabled: bool,
	logo_id: Option<String>,
	updated_at: DateTime<Utc>,
}

impl From<SettingsRow> for Settings {
	fn from(row: SettingsRow) -> Self {
		Self {
			id: row.id,
			name: row.name,
			area_of_play: row.area_of_play,
			steam_api_key: row.steam_api_key,
			whitelisted: row.whitelisted,
			tow_whitelisted: row.tow_whitelisted,
			taxi_whitelisted: row.taxi_whitelisted,
			business_whitelisted: row.business_whitelisted,
			registration_code: row.registration_code,
			roleplay_enabled: row.roleplay_enabled,
			logo_id: row.logo_id,
			updated_at: row.updated_at,
		}
	}
}

#[derive(FromRow)]
struct VehicleRow {
	id: Uuid,
	plate: String,
	model: String,
	user_id: Uuid,
	citizen_id: Uuid,
	created_at: DateTime<Utc>,
	updated_at: DateTime<Utc>,
	name: String,
	surname: String,
}

impl From<VehicleRow> for Vehicle {
	fn from(row: VehicleRow) -> Self {
		Self {
			id: row.id,
			plate: row.plate,
			model: row.model,
			user_id: row.user_id,
			citizen_id: row.citizen_id,
			citizen: CitizenProjection {
				id: row.citizen_id,
				name: row.name,
				surname: row.surname,
			},
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

#[derive(FromRow)]
struct ValueRow {
	id: Uuid,
	#[sqlx(rename = "type")]
	kind: String,
	value: String,
	position: Option<i32>,
	is_default: bool,
	created_at: DateTime<Utc>,
}

impl TryFrom<ValueRow> for Value {
	type Error = Error;

	fn try_from(row: ValueRow) -> Result<Self> {
		Ok(Self {
			id: row.id,
			kind: row.kind.parse::<ValueType>().map_err(|e| corrupt("value", e))?,
			value: row.value,
			position: row.position,
			is_default: row.is_default,
			created_at: row.created_at,
		})
	}
}

/// A [`Store`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgStore {
	pool: PgPool,
}

impl PgStore {
	/// Connects to the database and applies any pending migrations.
	pub async fn connect(url: &str) -> Result<Self> {
		let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;

		sqlx::migrate!().run(&pool).await?;
		tracing::info!("applied database migrations");

		Ok(Self { pool })
	}

	async fn user_where(&self, filter: &str, id: Uuid) -> Result<Option<User>> {
		let row = sqlx::query_as::<_, UserRow>(&format!(
			r#"SELECT id, username, rank, permissions, created_at FROM "user" WHERE id = ({filter})"#
		))
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		row.map(User::try_from).transpose()
	}
}

#[axum::async_trait]
impl Store for PgStore {
	async fn user_by_session(&self, session: Uuid) -> Result<Option<User>> {
		self.user_where("SELECT user_id FROM session WHERE id = $1", session)
			.await
	}

	async fn user_by_api_key(&self, key: Uuid) -> Result<Option<User>> {
		self.user_where("SELECT user_id FROM api_key WHERE id = $1", key)
			.await
	}

	async fn list_courthouse_posts(&self) -> Result<Vec<CourthousePost>> {
		sqlx::query_as::<_, PostRow>(&format!(
			r#"SELECT {POST_COLUMNS} FROM courthouse_post post
			JOIN "user" ON "user".id = post.user_id
			ORDER BY post.created_at DESC"#
		))
		.fetch_all(&self.pool)
		.await?
		.into_iter()
		.map(CourthousePost::try_from)
		.collect()
	}

	async fn find_courthouse_post(&self, id: Uuid) -> Result<Option<CourthousePost>> {
		sqlx::query_as::<_, PostRow>(&format!(
			r#"SELECT {POST_COLUMNS} FROM courthouse_post post
			JOIN "user" ON "user".id = post.user_id
			WHERE post.id = $1"#
		))
		.bind(id)
		.fetch_optional(&self.pool)
		.await?
		.map(CourthousePost::try_from)
		.transpose()
	}

	async fn create_courthouse_post(
		&self,
		user_id: Uuid,
		input: &CourthousePostInput,
	) -> Result<CourthousePost> {
		sqlx::query_as::<_, PostRow>(&format!(
			r#"WITH post AS (
				INSERT INTO courthouse_post (title, description_data, user_id)
				VALUES ($1, $2, $3)
				RETURNING *
			)
			SELECT {POST_COLUMNS} FROM post JOIN "user" ON "user".id = post.user_id"#
		))
		.bind(&input.title)
		.bind(&input.description_data)
		.bind(user_id)
		.fetch_one(&self.pool)
		.await?
		.try_into()
	}

	async fn update_courthouse_post(
		&self,
		id: Uuid,
		input: &CourthousePostInput,
	) -> Result<Option<CourthousePost>> {
		sqlx::query_as::<_, PostRow>(&format!(
			r#"WITH post AS (
				UPDATE courthouse_post
				SET title = $2, description_data = $3, updated_at = now()
				WHERE id = $1
				RETURNING *
			)
			SELECT {POST_COLUMNS} FROM post JOIN "user" ON "user".id = post.user_id"#
		))
		.bind(id)
		.bind(&input.title)
		.bind(&input.description_data)
		.fetch_optional(&self.pool)
		.await?
		.map(CourthousePost::try_from)
		.transpose()
	}

	async fn delete_courthouse_post(&self, id: Uuid) -> Result<bool> {
		let result = sqlx::query("DELETE FROM courthouse_post WHERE id = $1")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	async fn settings(&self) -> Result<Settings> {
		sqlx::query_as::<_, SettingsRow>("SELECT * FROM settings LIMIT 1")
			.fetch_optional(&self.pool)
			.await?
			.map(Settings::from)
			.ok_or(Error::MissingSettings)
	}

	async fn update_settings(&self, input: &SettingsInput) -> Result<Settings> {
		sqlx::query_as::<_, SettingsRow>(
			r"UPDATE settings SET
				name = $1,
				area_of_play = $2,
				steam_api_key = $3,
				whitelisted = $4,
				tow_whitelisted = $5,
				taxi_whitelisted = $6,
				business_whitelisted = $7,
				registration_code = $8,
				roleplay_enabled = $9,
				updated_at = now()
			RETURNING *",
		)
		.bind(&input.name)
		.bind(&input.area_of_play)
		.bind(&input.steam_api_key)
		.bind(input.whitelisted)
		.bind(input.tow_whitelisted)
		.bind(input.taxi_whitelisted)
		.bind(input.business_whitelisted)
		.bind(&input.registration_code)
		.bind(input.roleplay_enabled)
		.fetch_optional(&self.pool)
		.await?
		.map(Settings::from)
		.ok_or(Error::MissingSettings)
	}

	async fn set_logo(&self, logo_id: &str) -> Result<Settings> {
		sqlx::query_as::<_, SettingsRow>(
			"UPDATE settings SET logo_id = $1, updated_at = now() RETURNING *",
		)
		.bind(logo_id)
		.fetch_optional(&self.pool)
		.await?
		.map(Settings::from)
		.ok_or(Error::MissingSettings)
	}

	async fn feature_enabled(&self, feature: Feature) -> Result<bool> {
		let enabled = sqlx::query_scalar::<_, bool>(
			"SELECT is_enabled FROM cad_feature WHERE feature = $1",
		)
		.bind(feature.as_str())
		.fetch_optional(&self.pool)
		.await?;

		Ok(enabled.unwrap_or(true))
	}

	async fn set_feature(&self, feature: Feature, enabled: bool) -> Result<()> {
		sqlx::query(
			r"INSERT INTO cad_feature (feature, is_enabled) VALUES ($1, $2)
			ON CONFLICT (feature) DO UPDATE SET is_enabled = EXCLUDED.is_enabled",
		)
		.bind(feature.as_str())
		.bind(enabled)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	async fn find_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>> {
		let row = sqlx::query_as::<_, VehicleRow>(&format!(
			r"SELECT {VEHICLE_COLUMNS} FROM vehicle
			JOIN citizen ON citizen.id = vehicle.citizen_id
			WHERE vehicle.id = $1"
		))
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(Vehicle::from))
	}

	async fn find_citizen(&self, id: Uuid) -> Result<Option<Citizen>> {
		let citizen = sqlx::query_as::<_, (Uuid, Uuid, String, String)>(
			"SELECT id, user_id, name, surname FROM citizen WHERE id = $1",
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		Ok(citizen.map(|(id, user_id, name, surname)| Citizen {
			id,
			user_id,
			name,
			surname,
		}))
	}

	async fn transfer_vehicle(
		&self,
		id: Uuid,
		from: Uuid,
		owner: &Citizen,
	) -> Result<Option<Vehicle>> {
		let row = sqlx::query_as::<_, VehicleRow>(&format!(
			r"WITH vehicle AS (
				UPDATE vehicle SET citizen_id = $2, user_id = $3, updated_at = now()
				WHERE id = $1 AND user_id = $4
				RETURNING *
			)
			SELECT {VEHICLE_COLUMNS} FROM vehicle
			JOIN citizen ON citizen.id = vehicle.citizen_id"
		))
		.bind(id)
		.bind(owner.id)
		.bind(owner.user_id)
		.bind(from)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(Vehicle::from))
	}

	async fn list_values(&self, kind: ValueType) -> Result<Vec<Value>> {
		sqlx::query_as::<_, ValueRow>(&format!(
			"SELECT {VALUE_COLUMNS} FROM value WHERE type = $1
			ORDER BY position ASC NULLS LAST, value ASC"
		))
		.bind(kind.as_str())
		.fetch_all(&self.pool)
		.await?
		.into_iter()
		.map(Value::try_from)
		.collect()
	}

	async fn search_values(
		&self,
		kind: ValueType,
		query: &str,
		limit: usize,
	) -> Result<Vec<Value>> {
		// strpos sidesteps escaping LIKE wildcards in user input
		sqlx::query_as::<_, ValueRow>(&format!(
			"SELECT {VALUE_COLUMNS} FROM value
			WHERE type = $1 AND strpos(lower(value), lower($2)) > 0
			ORDER BY position ASC NULLS LAST, value ASC
			LIMIT $3"
		))
		.bind(kind.as_str())
		.bind(query)
		.bind(i64::try_from(limit).unwrap_or(i64::MAX))
		.fetch_all(&self.pool)
		.await?
		.into_iter()
		.map(Value::try_from)
		.collect()
	}
}
