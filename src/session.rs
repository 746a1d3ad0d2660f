use uuid::Uuid;

pub const COOKIE_NAME: &str = "session";

/// Creates a session cookie with no expiry
pub fn create_cookie(session_id: Uuid) -> cookie::Cookie<'static> {
	cookie::Cookie::build((COOKIE_NAME, session_id.to_string()))
		.secure(!cfg!(debug_assertions))
		.http_only(true)
		.path("/")
		.into()
}

/// The `Cookie` request header value that carries a session.
pub fn header_value(session_id: Uuid) -> String {
	create_cookie(session_id).stripped().to_string()
}
