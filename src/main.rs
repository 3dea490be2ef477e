#[macro_use]
extern crate log;

mod config;
mod error;
mod handlers;
mod model;
mod query;
mod store;

use anyhow::anyhow;
use env_logger::Env;
use iron::Iron;
use logger::Logger;

use crate::config::Config;
use crate::store::PostStore;

// RUST_LOG=logger=info,posts_backend=debug posts_backend > logs 2>&1 &
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let store = if config.seed {
        PostStore::seeded()
    } else {
        PostStore::new()
    };
    info!("starting with {} posts", store.len());

    let (logger_before, logger_after) = Logger::new(None);

    let mut chain = handlers::app(store);
    chain.link_before(logger_before); // Should be first!
    chain.link_after(logger_after); // Should be last!

    let (host, port) = config.addr();
    // Dropping the listener joins the server thread.
    let _listening = Iron::new(chain)
        .http((host, port))
        .map_err(|e| anyhow!("cannot listen on {}:{}: {}", host, port, e))?;
    info!("listening on http://{}:{}", host, port);
    Ok(())
}
