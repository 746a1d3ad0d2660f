pub mod auth;
pub mod courthouse;
pub mod docs;
pub mod model;
pub mod settings;
pub mod value;
pub mod vehicle;
