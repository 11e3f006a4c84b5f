pub mod capture;
pub mod driver;
