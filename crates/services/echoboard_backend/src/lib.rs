// --- File: crates/services/echoboard_backend/src/lib.rs ---
pub mod app_state;
pub mod routes;
