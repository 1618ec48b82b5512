mod auth;
mod cookies;
mod health_check;

pub use auth::{change_password, get_user_details, log_out, login, refresh_token, register_user};
pub use cookies::CookiePolicy;
pub use health_check::health_check;
