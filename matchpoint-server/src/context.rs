use std::sync::Arc;

use axum::extract::FromRef;
use matchpoint_core::{Backend, FcmSender, RestDirectory, RestStore};

/// The backend with its production collaborators plugged in.
pub type AppBackend = Backend<RestStore, RestDirectory, FcmSender>;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub backend: Arc<AppBackend>,
}
