pub mod relay;
pub mod repository;
pub mod service;
