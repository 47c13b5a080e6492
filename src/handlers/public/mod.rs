// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Middleware: global layers only (CORS, tracing, body limit)

pub mod status;

pub use status::{health, root};
