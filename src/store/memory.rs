use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
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

#[derive(Debug, Clone)]
struct PostRow {
	id: Uuid,
	title: String,
	description_data: serde_json::Value,
	user_id: Uuid,
	created_at: DateTime<Utc>,
	updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct VehicleRow {
	id: Uuid,
	plate: String,
	model: String,
	user_id: Uuid,
	citizen_id: Uuid,
	created_at: DateTime<Utc>,
	updated_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Tables {
	users: HashMap<Uuid, User>,
	sessions: HashMap<Uuid, Uuid>,
	api_keys: HashMap<Uuid, Uuid>,
	/// Kept in insertion order.
	posts: Vec<PostRow>,
	settings: Settings,
	disabled: HashSet<Feature>,
	citizens: HashMap<Uuid, Citizen>,
	vehicles: HashMap<Uuid, VehicleRow>,
	values: Vec<Value>,
}

impl Tables {
	fn corrupt(table: &'static str, reason: impl Into<String>) -> Error {
		Error::Corrupt {
			table,
			reason: reason.into(),
		}
	}

	fn post(&self, row: &PostRow) -> Result<CourthousePost> {
		let user = self
			.users
			.get(&row.user_id)
			.ok_or_else(|| Self::corrupt("courthouse_post", format!("unknown user {}", row.user_id)))?;

		Ok(CourthousePost {
			id: row.id,
			title: row.title.clone(),
			description_data: row.description_data.clone(),
			user_id: row.user_id,
			user: UserProjection::from(user),
			created_at: row.created_at,
			updated_at: row.updated_at,
		})
	}

	fn vehicle(&self, row: &VehicleRow) -> Result<Vehicle> {
		let citizen = self
			.citizens
			.get(&row.citizen_id)
			.ok_or_else(|| Self::corrupt("vehicle", format!("unknown citizen {}", row.citizen_id)))?;

		Ok(Vehicle {
			id: row.id,
			plate: row.plate.clone(),
			model: row.model.clone(),
			user_id: row.user_id,
			citizen_id: row.citizen_id,
			citizen: CitizenProjection::from(citizen),
			created_at: row.created_at,
			updated_at: row.updated_at,
		})
	}

	fn values_of(&self, kind: ValueType) -> Vec<Value> {
		let mut values = self
			.values
			.iter()
			.filter(|value| value.kind == kind)
			.cloned()
			.collect::<Vec<_>>();

		// Unpositioned values sort last
		values.sort_by(|a, b| {
			(a.position.is_none(), a.position, &a.value).cmp(&(b.position.is_none(), b.position, &b.value))
		});

		values
	}
}

/// A [`Store`] that keeps everything in process memory.
#[derive(Debug)]
pub struct MemoryStore {
	tables: RwLock<Tables>,
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryStore {
	pub fn new() -> Self {
		Self {
			tables: RwLock::new(Tables {
				users: HashMap::new(),
				sessions: HashMap::new(),
				api_keys: HashMap::new(),
				posts: Vec::new(),
				settings: Settings {
					id: Uuid::new_v4(),
					name: "Roleplay CAD".into(),
					area_of_play: None,
					steam_api_key: None,
					whitelisted: false,
					tow_whitelisted: false,
					taxi_whitelisted: false,
					business_whitelisted: false,
					registration_code: None,
					roleplay_enabled: true,
					logo_id: None,
					updated_at: Utc::now(),
				},
				disabled: HashSet::new(),
				citizens: HashMap::new(),
				vehicles: HashMap::new(),
				values: Vec::new(),
			}),
		}
	}

	/// A store with an owner account and some reference data, for running
	/// the server without a database. Returns the owner's session id.
	pub async fn development() -> (Self, Uuid) {
		let store = Self::new();
		let owner = store.insert_user("owner", Rank::Owner, Vec::new()).await;
		let session = store.insert_session(owner).await;
		let citizen = store.insert_citizen(owner, "John", "Doe").await;

		store.insert_vehicle(citizen, "5ABC123", "Declasse Vigero").await;

		for (position, address) in ["Grove Street", "Alta Street", "Vinewood Boulevard"]
			.into_iter()
			.enumerate()
		{
			let position = i32::try_from(position).ok();

			store.insert_value_at(ValueType::Address, address, position).await;
		}

		(store, session)
	}

	pub async fn insert_user(&self, username: &str, rank: Rank, permissions: Vec<Permission>) -> Uuid {
		let user = User {
			id: Uuid::new_v4(),
			username: username.into(),
			rank,
			permissions,
			created_at: Utc::now(),
		};
		let id = user.id;

		self.tables.write().await.users.insert(id, user);
		id
	}

	pub async fn insert_session(&self, user_id: Uuid) -> Uuid {
		let id = Uuid::new_v4();

		self.tables.write().await.sessions.insert(id, user_id);
		id
	}

	pub async fn insert_api_key(&self, user_id: Uuid) -> Uuid {
		let id = Uuid::new_v4();

		self.tables.write().await.api_keys.insert(id, user_id);
		id
	}

	pub async fn insert_citizen(&self, user_id: Uuid, name: &str, surname: &str) -> Uuid {
		let citizen = Citizen {
			id: Uuid::new_v4(),
			user_id,
			name: name.into(),
			surname: surname.into(),
		};
		let id = citizen.id;

		self.tables.write().await.citizens.insert(id, citizen);
		id
	}

	/// Registers a vehicle to a citizen and the user that controls them.
	///
	/// The citizen must have been inserted first.
	pub async fn insert_vehicle(&self, citizen_id: Uuid, plate: &str, model: &str) -> Uuid {
		let mut tables = self.tables.write().await;
		let user_id = tables
			.citizens
			.get(&citizen_id)
			.map_or_else(Uuid::nil, |citizen| citizen.user_id);
		let now = Utc::now();
		let row = VehicleRow {
			id: Uuid::new_v4(),
			plate: plate.into(),
			model: model.into(),
			user_id,
			citizen_id,
			created_at: now,
			updated_at: now,
		};
		let id = row.id;

		tables.vehicles.insert(id, row);
		id
	}

	pub async fn insert_value(&self, kind: ValueType, value: &str) -> Uuid {
		self.insert_value_at(kind, value, None).await
	}

	pub async fn insert_value_at(&self, kind: ValueType, value: &str, position: Option<i32>) -> Uuid {
		let value = Value {
			id: Uuid::new_v4(),
			kind,
			value: value.into(),
			position,
			is_default: false,
			created_at: Utc::now(),
		};
		let id = value.id;

		self.tables.write().await.values.push(value);
		id
	}
}

#[axum::async_trait]
impl Store for MemoryStore {
	async fn user_by_session(&self, session: Uuid) -> Result<Option<User>> {
		let tables = self.tables.read().await;

		Ok(tables
			.sessions
			.get(&session)
			.and_then(|user_id| tables.users.get(user_id))
			.cloned())
	}

	async fn user_by_api_key(&self, key: Uuid) -> Result<Option<User>> {
		let tables = self.tables.read().await;

		Ok(tables
			.api_keys
			.get(&key)
			.and_then(|user_id| tables.users.get(user_id))
			.cloned())
	}

	async fn list_courthouse_posts(&self) -> Result<Vec<CourthousePost>> {
		let tables = self.tables.read().await;
		let mut rows = tables.posts.iter().rev().collect::<Vec<_>>();

		// Stable, so posts created in the same instant stay newest first
		rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		rows.into_iter().map(|row| tables.post(row)).collect()
	}

	async fn find_courthouse_post(&self, id: Uuid) -> Result<Option<CourthousePost>> {
		let tables = self.tables.read().await;

		tables
			.posts
			.iter()
			.find(|row| row.id == id)
			.map(|row| tables.post(row))
			.transpose()
	}

	async fn create_courthouse_post(
		&self,
		user_id: Uuid,
		input: &CourthousePostInput,
	) -> Result<CourthousePost> {
		let mut tables = self.tables.write().await;
		let now = Utc::now();
		let row = PostRow {
			id: Uuid::new_v4(),
			title: input.title.clone(),
			description_data: input.description_data.clone(),
			user_id,
			created_at: now,
			updated_at: now,
		};

		let post = tables.post(&row)?;

		tables.posts.push(row);
		Ok(post)
	}

	async fn update_courthouse_post(
		&self,
		id: Uuid,
		input: &CourthousePostInput,
	) -> Result<Option<CourthousePost>> {
		let mut tables = self.tables.write().await;
		let Some(index) = tables.posts.iter().position(|row| row.id == id) else {
			return Ok(None);
		};

		let row = &mut tables.posts[index];

		row.title.clone_from(&input.title);
		row.description_data.clone_from(&input.description_data);
		row.updated_at = Utc::now();

		let row = row.clone();

		tables.post(&row).map(Some)
	}

	async fn delete_courthouse_post(&self, id: Uuid) -> Result<bool> {
		let mut tables = self.tables.write().await;
		let before = tables.posts.len();

		tables.posts.retain(|row| row.id != id);
		Ok(tables.posts.len() != before)
	}

	async fn settings(&self) -> Result<Settings> {
		Ok(self.tables.read().await.settings.clone())
	}

	async fn update_settings(&self, input: &SettingsInput) -> Result<Settings> {
		let mut tables = self.tables.write().await;
		let settings = &mut tables.settings;

		settings.name.clone_from(&input.name);
		settings.area_of_play.clone_from(&input.area_of_play);
		settings.steam_api_key.clone_from(&input.steam_api_key);
		settings.whitelisted = input.whitelisted;
		settings.tow_whitelisted = input.tow_whitelisted;
		settings.taxi_whitelisted = input.taxi_whitelisted;
		settings.business_whitelisted = input.business_whitelisted;
		settings.registration_code.clone_from(&input.registration_code);
		settings.roleplay_enabled = input.roleplay_enabled;
		settings.updated_at = Utc::now();

		Ok(settings.clone())
	}

	async fn set_logo(&self, logo_id: &str) -> Result<Settings> {
		let mut tables = self.tables.write().await;

		tables.settings.logo_id = Some(logo_id.to_owned());
		tables.settings.updated_at = Utc::now();

		Ok(tables.settings.clone())
	}

	async fn feature_enabled(&self, feature: Feature) -> Result<bool> {
		Ok(!self.tables.read().await.disabled.contains(&feature))
	}

	async fn set_feature(&self, feature: Feature, enabled: bool) -> Result<()> {
		let mut tables = self.tables.write().await;

		if enabled {
			tables.disabled.remove(&feature);
		} else {
			tables.disabled.insert(feature);
		}

		Ok(())
	}

	async fn find_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>> {
		let tables = self.tables.read().await;

		tables.vehicles.get(&id).map(|row| tables.vehicle(row)).transpose()
	}

	async fn find_citizen(&self, id: Uuid) -> Result<Option<Citizen>> {
		Ok(self.tables.read().await.citizens.get(&id).cloned())
	}

	async fn transfer_vehicle(
		&self,
		id: Uuid,
		from: Uuid,
		owner: &Citizen,
	) -> Result<Option<Vehicle>> {
		let mut tables = self.tables.write().await;
		let Some(row) = tables.vehicles.get_mut(&id).filter(|row| row.user_id == from) else {
			return Ok(None);
		};

		row.citizen_id = owner.id;
		row.user_id = owner.user_id;
		row.updated_at = Utc::now();

		let row = row.clone();

		tables.vehicle(&row).map(Some)
	}

	async fn list_values(&self, kind: ValueType) -> Result<Vec<Value>> {
		Ok(self.tables.read().await.values_of(kind))
	}

	async fn search_values(
		&self,
		kind: ValueType,
		query: &str,
		limit: usize,
	) -> Result<Vec<Value>> {
		Ok(self
			.tables
			.read()
			.await
			.values_of(kind)
			.into_iter()
			.filter(|value| value.matches(query))
			.take(limit)
			.collect())
	}
}

#[cfg(test)]
mod test {
	use serde_json::json;

	use super::*;

	fn input(title: &str) -> CourthousePostInput {
		CourthousePostInput {
			title: title.into(),
			description_data: json!([{ "type": "paragraph" }]),
		}
	}

	#[tokio::test]
	async fn test_posts_are_listed_newest_first() {
		let store = MemoryStore::new();
		let user = store.insert_user("admin", Rank::Admin, Vec::new()).await;

		for title in ["first", "second", "third"] {
			store.create_courthouse_post(user, &input(title)).await.unwrap();
		}

		let titles = store
			.list_courthouse_posts()
			.await
			.unwrap()
			.into_iter()
			.map(|post| post.title)
			.collect::<Vec<_>>();

		assert_eq!(titles, ["third", "second", "first"]);
	}

	#[tokio::test]
	async fn test_post_for_unknown_user_is_not_stored() {
		let store = MemoryStore::new();

		assert!(matches!(
			store.create_courthouse_post(Uuid::new_v4(), &input("orphan")).await,
			Err(Error::Corrupt { .. })
		));
		assert!(store.list_courthouse_posts().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_update_and_delete_missing_post() {
		let store = MemoryStore::new();

		assert!(store
			.update_courthouse_post(Uuid::new_v4(), &input("nope"))
			.await
			.unwrap()
			.is_none());
		assert!(!store.delete_courthouse_post(Uuid::new_v4()).await.unwrap());
	}

	#[tokio::test]
	async fn test_features_default_to_enabled() {
		let store = MemoryStore::new();

		store.set_feature(Feature::Tow, false).await.unwrap();

		let states = store.features().await.unwrap();

		assert_eq!(states.len(), Feature::ALL.len());
		assert!(states
			.iter()
			.all(|state| state.is_enabled == (state.feature != Feature::Tow)));

		store.set_feature(Feature::Tow, true).await.unwrap();

		assert!(store.feature_enabled(Feature::Tow).await.unwrap());
	}

	#[tokio::test]
	async fn test_transfer_moves_vehicle_to_new_user() {
		let store = MemoryStore::new();
		let alice = store.insert_user("alice", Rank::User, Vec::new()).await;
		let bob = store.insert_user("bob", Rank::User, Vec::new()).await;
		let from = store.insert_citizen(alice, "Alice", "Smith").await;
		let to = store.insert_citizen(bob, "Bob", "Jones").await;
		let vehicle = store.insert_vehicle(from, "ABC", "Futo").await;

		let owner = store.find_citizen(to).await.unwrap().unwrap();
		let vehicle = store
			.transfer_vehicle(vehicle, alice, &owner)
			.await
			.unwrap()
			.unwrap();

		assert_eq!(vehicle.citizen_id, to);
		assert_eq!(vehicle.user_id, bob);
		assert_eq!(vehicle.citizen.surname, "Jones");
	}

	#[tokio::test]
	async fn test_transfer_requires_current_holder() {
		let store = MemoryStore::new();
		let alice = store.insert_user("alice", Rank::User, Vec::new()).await;
		let bob = store.insert_user("bob", Rank::User, Vec::new()).await;
		let from = store.insert_citizen(alice, "Alice", "Smith").await;
		let to = store.insert_citizen(bob, "Bob", "Jones").await;
		let vehicle = store.insert_vehicle(from, "ABC", "Futo").await;
		let owner = store.find_citizen(to).await.unwrap().unwrap();

		store
			.transfer_vehicle(vehicle, alice, &owner)
			.await
			.unwrap()
			.unwrap();

		// A second transfer from the old holder finds nothing to move
		let stale = store.transfer_vehicle(vehicle, alice, &owner).await.unwrap();

		assert!(stale.is_none());

		let stored = store.find_vehicle(vehicle).await.unwrap().unwrap();

		assert_eq!(stored.user_id, bob);
		assert_eq!(stored.citizen_id, to);
	}

	#[tokio::test]
	async fn test_values_sort_by_position_then_text() {
		let store = MemoryStore::new();

		store.insert_value(ValueType::Gender, "Other").await;
		store.insert_value(ValueType::Gender, "Female").await;
		store.insert_value_at(ValueType::Gender, "Male", Some(0)).await;
		store.insert_value(ValueType::Weapon, "Pistol").await;

		let values = store
			.list_values(ValueType::Gender)
			.await
			.unwrap()
			.into_iter()
			.map(|value| value.value)
			.collect::<Vec<_>>();

		assert_eq!(values, ["Male", "Female", "Other"]);
	}

	#[tokio::test]
	async fn test_development_seed() {
		let (store, session) = MemoryStore::development().await;
		let owner = store.user_by_session(session).await.unwrap().unwrap();

		assert_eq!(owner.rank, Rank::Owner);
		assert_eq!(store.list_values(ValueType::Address).await.unwrap().len(), 3);
	}
}
