#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::database::StoreError;
use crate::identity::Identity;

use super::model::{Maintainer, Site};
use super::store::SiteStore;

#[derive(Clone, Default)]
pub struct MockSiteStore {
    pub sites: Arc<Mutex<HashMap<String, Site>>>,
    pub maintainers: Arc<Mutex<HashMap<String, Vec<Maintainer>>>>,
    pub logs: Arc<Mutex<Vec<(String, String, Option<i64>)>>>,
}

impl MockSiteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_site(&self, id: &str, is_runaway: bool) {
        self.sites.lock().unwrap().insert(
            id.to_string(),
            Site {
                id: id.to_string(),
                name: format!("site {id}"),
                is_active: !is_runaway,
                is_runaway,
            },
        );
    }

    pub fn add_maintainer(&self, site_id: &str, maintainer: Maintainer) {
        self.maintainers
            .lock()
            .unwrap()
            .entry(site_id.to_string())
            .or_default()
            .push(maintainer);
    }

    pub fn site(&self, id: &str) -> Option<Site> {
        self.sites.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl SiteStore for MockSiteStore {
    async fn find(&self, site_id: &str) -> Result<Option<Site>, StoreError> {
        Ok(self.site(site_id))
    }

    async fn maintainers(&self, site_id: &str) -> Result<Vec<Maintainer>, StoreError> {
        Ok(self
            .maintainers
            .lock()
            .unwrap()
            .get(site_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn restore_runaway(&self, site_id: &str, actor: &Identity) -> Result<(), StoreError> {
        let mut sites = self.sites.lock().unwrap();
        let site = sites.get_mut(site_id).ok_or(StoreError::NotFound)?;
        site.is_runaway = false;
        site.is_active = true;
        self.logs.lock().unwrap().push((
            site_id.to_string(),
            "RESTORE_RUNAWAY".to_string(),
            actor.id,
        ));
        Ok(())
    }
}
