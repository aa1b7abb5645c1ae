//! HTTP server for the persona chat service.
//!
//! # Endpoints
//!
//! - `GET  /health`              - Liveness probe
//! - `POST /api/chat`            - One conversation turn
//! - `GET  /api/characters`      - Persona catalog
//! - `GET  /api/characters/:id`  - One persona

pub mod routes;

pub use routes::{app_router, AppState, CharacterSummary, ChatPayload, ChatResponse};
