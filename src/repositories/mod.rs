pub mod driver_repository;
pub mod price_repository;
pub mod profile_repository;
pub mod quote_repository;
pub mod request_repository;
