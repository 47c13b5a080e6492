// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth, then per-resource authorization)
pub mod public; // Tier 1: service info and health
pub mod protected; // Tier 2: projects, contributors, issues, comments

pub use protected::*;
pub use public::*;
