pub mod chamados;
pub mod config;
pub mod dashboard;
pub mod seed;
pub mod server;
pub mod shared;
pub mod triage;
