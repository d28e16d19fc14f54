use std::sync::Arc;

use config::Config;
use identity::IdentityResolver;
use report::AdmissionGuard;
use session::SessionStore;
use site::SiteStore;

pub mod common;
pub mod config;
pub mod database;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod report;
pub mod router;
pub mod routes;
pub mod session;
pub mod site;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<dyn SessionStore>,
    pub identities: Arc<IdentityResolver>,
    pub reports: Arc<AdmissionGuard>,
    pub sites: Arc<dyn SiteStore>,
}
