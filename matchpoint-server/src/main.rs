use std::sync::Arc;

use log::{error, info};
use matchpoint_core::{Backend, FcmSender, RestDirectory, RestStore};
use matchpoint_server::{init_logger, run_server, Config, ServerContext};

#[tokio::main]
async fn main() {
    init_logger();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!("Invalid configuration: {error}");
            std::process::exit(1);
        }
    };

    let store = RestStore::new(&config.store_url);
    let directory = RestDirectory::new(&config.identity_url);
    let sender = FcmSender::new(&config.push_url, &config.push_key);

    let backend = Backend::new(store, directory, sender, &config.sentinel);

    let context = ServerContext {
        backend: Arc::new(backend),
    };

    info!("Listening on port {}.", config.port);
    run_server(context, config.port).await;
}
