//! sea-orm entities for the tables owned by the auth service.

pub mod credentials;
pub mod outbox_events;
pub mod password_resets;
pub mod refresh_tokens;
