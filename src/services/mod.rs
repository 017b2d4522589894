pub mod auth_service;
pub mod battlemap_service;
