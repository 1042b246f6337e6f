mod health;
mod pages;
mod url;

pub use health::health_handler;
pub use pages::{delete_page_handler, index_handler};
pub use url::{create_url_handler, delete_url_handler, redirect_handler};
