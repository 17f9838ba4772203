use oid_registry::OidRegistry;
use sha1::{Digest, Sha1};

use crate::config::Config;

/// State owned by one processing thread and lent to every session it
/// handles. Not shared across threads: each worker builds its own.
pub struct Worker {
    pub config: Config,
    sha1: Sha1,
    oids: OidRegistry<'static>,
}

impl Worker {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sha1: Sha1::new(),
            oids: OidRegistry::default().with_all_crypto().with_x509(),
        }
    }

    /// SHA-1 of `data` using the worker's hasher, which is left reset.
    pub fn sha1(&mut self, data: &[u8]) -> [u8; 20] {
        self.sha1.update(data);
        self.sha1.finalize_reset().into()
    }

    pub fn oids(&self) -> &OidRegistry<'static> {
        &self.oids
    }
}

impl Default for Worker {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
