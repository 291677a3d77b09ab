pub mod admin;
pub mod data;
pub mod guard;
pub mod headers;
pub mod models;
pub mod pages;
pub mod responses;
pub mod router;
pub mod state;
pub mod templates;

pub use guard::SESSION_COOKIE;
pub use state::AppState;
pub use templates::{escape_html, render_footer, render_page};
