//! # sqld REST API Module
//!
//! Maps HTTP requests onto table operations: `GET` reads, `POST` creates,
//! `PUT` updates, `DELETE` deletes, and `POST` at the prefix root runs raw
//! SQL when enabled.

pub mod errors;
pub mod handler;
pub mod parser;
pub mod response;
pub mod server;

pub use handler::RestRequest;
pub use parser::{Intent, Payload, Target};
pub use response::Reply;
pub use server::RestServer;
