//! Page modelling for mobile test automation: projects of pages and
//! captured states, a searchable module tree, XPath locator evaluation and
//! highlighting, and condensing of recorded device sessions.

pub mod cli;
pub mod device;
pub mod error;
pub mod locator;
pub mod project;
pub mod recording;
pub mod report;
pub mod tree;
pub mod xpath;

pub use error::StudioError;
