pub mod building;
pub mod car;
pub mod debug;
pub mod logger;
pub mod status;
