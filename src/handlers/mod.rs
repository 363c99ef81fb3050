// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer JWT, role checks inside the services)
pub mod protected;
pub mod public;
