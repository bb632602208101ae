// handlers/mod.rs - Handlers grouped by access tier
//
// Public (no auth): service info and health
// Protected (bearer token): assets, templates, lease contracts, Intune lookups

pub mod protected;
pub mod public;
