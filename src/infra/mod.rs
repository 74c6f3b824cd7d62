// Adapters for the application ports

pub mod http_client;
