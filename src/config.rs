//! Process configuration, read from the environment once at start-up.

use std::{net::IpAddr, path::PathBuf, str::FromStr};

use tracing::Level;

#[derive(Debug, thiserror::Error)]
#[error("invalid {key}: {value:?}")]
pub struct Error {
	key: &'static str,
	value: String,
}

#[derive(Debug, Clone)]
pub struct Config {
	pub host: IpAddr,
	pub port: u16,
	/// Absent means the in-memory store is used.
	pub database_url: Option<String>,
	pub upload_dir: PathBuf,
	pub log_level: Level,
	/// Enables the OpenTelemetry exporters when set.
	pub otlp_endpoint: Option<String>,
	pub trace_sample_ratio: f64,
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Builds the configuration from any key-value source.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

		Ok(Self {
			host: parse(&var, "HOST")?.unwrap_or(IpAddr::from([127, 0, 0, 1])),
			port: parse(&var, "PORT")?.unwrap_or(3000),
			database_url: var("DATABASE_URL"),
			upload_dir: var("UPLOAD_DIR").map_or_else(|| PathBuf::from("./uploads"), PathBuf::from),
			log_level: parse(&var, "LOG_LEVEL")?.unwrap_or(Level::INFO),
			otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
			trace_sample_ratio: match parse::<f64>(&var, "TRACE_SAMPLE_RATIO")? {
				Some(ratio) if !(0.0..=1.0).contains(&ratio) => {
					return Err(Error {
						key: "TRACE_SAMPLE_RATIO",
						value: ratio.to_string(),
					})
				}
				Some(ratio) => ratio,
				None => 1.0,
			},
		})
	}
}

fn parse<T: FromStr>(
	var: &impl Fn(&str) -> Option<String>,
	key: &'static str,
) -> Result<Option<T>, Error> {
	var(key)
		.map(|value| value.trim().parse().map_err(|_| Error { key, value }))
		.transpose()
}
