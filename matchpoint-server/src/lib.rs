use std::net::{Ipv6Addr, SocketAddr};

use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

mod cleanup;
mod config;
mod context;
mod errors;
mod events;
mod logging;
mod schemas;
mod serialized;

pub use config::*;
pub use context::*;
pub use errors::*;
pub use logging::*;

pub type Router = axum::Router<ServerContext>;

/// Starts the matchpoint server
pub async fn run_server(context: ServerContext, port: u16) {
    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new()
        .merge(events::router())
        .merge(cleanup::router());

    let root_router = Router::new()
        .nest("/v1", version_one_router)
        .layer(cors)
        .with_state(context);

    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    axum::serve(listener, root_router.into_make_service())
        .await
        .unwrap();
}
