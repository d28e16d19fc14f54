#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::model::Identity;
use super::provider::{IdentityError, IdentityProvider};

#[derive(Clone)]
pub struct MockIdentityProvider {
    outcome: Result<Identity, u16>,
    calls: Arc<AtomicUsize>,
    last_token: Arc<Mutex<Option<String>>>,
}

impl MockIdentityProvider {
    pub fn returning(id: i64, username: &str) -> Self {
        Self::with_outcome(Ok(Identity {
            id: Some(id),
            username: username.to_string(),
            trust_level: 2,
            name: None,
            avatar_template: None,
        }))
    }

    pub fn failing(status: u16) -> Self {
        Self::with_outcome(Err(status))
    }

    fn with_outcome(outcome: Result<Identity, u16>) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
            last_token: Arc::new(Mutex::new(None)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_token(&self) -> Option<String> {
        self.last_token.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn fetch_user(&self, access_token: &str) -> Result<Identity, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(access_token.to_string());
        match &self.outcome {
            Ok(identity) => Ok(identity.clone()),
            Err(status) => Err(IdentityError::Upstream {
                status: *status,
                detail: "mock failure".into(),
            }),
        }
    }
}
