mod auth;
mod publications;
mod ui;

pub use auth::{SESSION_MAX_AGE_SECS, check, login, logout};
pub use publications::{
    create_publication, delete_publication, list_publications, update_publication,
};
pub use ui::{login_page, publications_admin_page};
