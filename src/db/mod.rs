#[cfg(test)]
pub mod mock_db;
pub mod postgres;
pub mod repository;
