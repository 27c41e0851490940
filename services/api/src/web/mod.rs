pub mod protocol;
pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible
// to the binary that builds the web server router.
pub use rest::{
    apply_action_handler, create_wizard_handler, delete_wizard_handler, get_wizard_handler,
    publish_wizard_handler,
};
