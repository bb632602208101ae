// handlers/protected/mod.rs - Endpoints behind bearer-token authentication
//
// Every route here runs after auth_middleware, so an AuthUser is always
// present in the request extensions.

pub mod assets;
pub mod intune;
pub mod leases;
pub mod templates;
