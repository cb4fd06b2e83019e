//! Wiring of stores, gateway and engine for one CLI run.

use std::sync::Arc;

use anyhow::{Context, Result};
use freeagle_core::config::FreeagleConfig;
use freeagle_core::favorites::FavoritesLedger;
use freeagle_core::gateway::{EventGateway, HttpGateway};
use freeagle_core::identity::Identity;
use freeagle_core::membership::MembershipStore;
use freeagle_core::preferences::{FilePreferences, Preferences};
use freeagle_core::reconcile::InviteEngine;

pub struct App {
    pub gateway: Arc<dyn EventGateway>,
    pub identity: Identity,
    pub favorites: FavoritesLedger,
    pub engine: InviteEngine,
}

impl App {
    pub fn load() -> Result<Self> {
        let config = FreeagleConfig::load().context("Failed to load configuration")?;

        let prefs: Arc<dyn Preferences> = Arc::new(FilePreferences::new(config.data_path()));
        let gateway: Arc<dyn EventGateway> = Arc::new(HttpGateway::from_config(&config)?);
        let memberships = Arc::new(MembershipStore::open(prefs.clone()));

        Ok(App {
            gateway: gateway.clone(),
            identity: Identity::new(prefs.clone()),
            favorites: FavoritesLedger::new(prefs),
            engine: InviteEngine::new(gateway, memberships, config.share_order),
        })
    }

    pub fn username(&self) -> Result<String> {
        Ok(self.identity.require()?)
    }
}
