pub mod clock;
pub mod store_errors;
