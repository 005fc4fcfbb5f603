#[macro_use]
extern crate rocket;

mod config;
mod cors;
mod routes;

use ballot_relay::*;
use ballot_relay_near::NearLedger;
use config::Config;
use rocket::figment::Figment;
use rocket::{Build, Rocket};
use std::sync::Arc;

/// Everything a request handler needs, built once at startup
pub struct Relay {
    pub keys: KeyRelay,
    pub votes: VoteRelay,
    pub views: ViewGateway,
    pub admin_key: AdminKey,
}

impl Relay {
    pub fn new(
        store: Arc<dyn KeyStore>,
        ledger: Arc<dyn Ledger>,
        policy: RelayPolicy,
        admin_key: AdminKey,
    ) -> Self {
        Relay {
            keys: KeyRelay::new(store, ledger.clone(), policy),
            votes: VoteRelay::new(ledger.clone(), policy.gas),
            views: ViewGateway::new(ledger),
            admin_key,
        }
    }
}

pub fn build(figment: Figment, relay: Relay) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(relay)
        .attach(cors::stage())
        .mount("/", routes::routes())
        .register("/", routes::catchers())
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let store = SqliteKeyStore::connect(
        &config.store_uri,
        &config.database_name,
        &config.collection_name,
    )
    .await?;
    let ledger = NearLedger::new(&config.near())?;

    let relay = Relay::new(
        Arc::new(store),
        Arc::new(ledger),
        config.policy,
        AdminKey::new(config.admin_api_key.clone()),
    );

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.server_port));

    if let Err(e) = build(figment, relay).launch().await {
        return Err(anyhow::anyhow!("ballot_relayd: server failed: {}", e));
    }

    Ok(())
}
