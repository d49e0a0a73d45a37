pub mod runtime;
pub mod script;
pub mod server;
