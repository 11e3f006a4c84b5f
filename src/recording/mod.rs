pub mod condenser;
pub mod recorder;
pub mod recording_model;
