use std::{net::SocketAddr, sync::Arc};

use roleplay_cad::{
	config::Config,
	ratelimit::Limits,
	store::{MemoryStore, PgStore},
	trace,
	upload::Uploads,
	AppState, Database,
};

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = Config::from_env().expect("invalid configuration");
	let _guard = trace::init(&config).expect("failed to initialize tracing");

	let database: Database = if let Some(url) = config.database_url.as_deref() {
		Arc::new(
			PgStore::connect(url)
				.await
				.expect("failed to connect to database"),
		)
	} else {
		let (store, session) = MemoryStore::development().await;

		tracing::warn!(%session, "DATABASE_URL is not set, using an in-memory store");
		Arc::new(store)
	};

	let state = AppState {
		database,
		uploads: Uploads::new(config.upload_dir.clone()),
	};

	let limits = Limits::new().expect("invalid rate limits");
	limits.spawn_cleanup();

	let app = roleplay_cad::app(state, Some(&limits));

	let listener = tokio::net::TcpListener::bind((config.host, config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on {}:{}", config.host, config.port);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await
	.expect("server error");
}
