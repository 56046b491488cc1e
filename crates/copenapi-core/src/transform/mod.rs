pub mod path_template;
pub mod spec_to_model;

pub use spec_to_model::{DEFAULT_MODULE_DESCRIPTION, load};
