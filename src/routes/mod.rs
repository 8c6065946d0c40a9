//! HTTP routes for the garden tracker

pub mod auth_routes;
pub mod health;
pub mod planting;
pub mod plants;
pub mod response;

pub use auth_routes::{handle_login, handle_me, handle_refresh, handle_register, handle_update_zip};
pub use health::{health_check, index, version_info};
pub use planting::handle_planting_info;
pub use plants::{
    handle_add_user_plant, handle_delete_user_plant, handle_list_catalog,
    handle_list_user_plants, handle_update_user_plant,
};
pub use response::{cors_preflight, error_response, method_not_allowed, not_found, respond, BoxBody};
