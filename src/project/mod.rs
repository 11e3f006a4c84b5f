pub mod project_model;
pub mod settings;
pub mod store;
