pub mod address;
pub mod chain;
pub mod cli;
pub mod commands;
pub mod config;
pub mod contract;
pub mod networks;
pub mod params;
pub mod receipt;
pub mod rpc;
pub mod signer;
pub mod treasury;
