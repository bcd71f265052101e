pub mod assignments;
pub mod config;
pub mod constants;
pub mod errors;
pub mod holders;
pub mod logger;
pub mod paths;
pub mod rpc;
pub mod world;

#[cfg(feature = "web")]
pub mod webserver;

#[cfg(test)]
mod test_support;
