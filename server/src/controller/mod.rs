pub use auth::AuthController;
pub use list::ListController;
pub use list_item::ListItemController;

mod auth;
mod list;
mod list_item;
