use std::sync::Arc;

use rand::{CryptoRng, RngCore};
use tracing::instrument;

use crate::bgv::{
    AutomorphismKeys, BgvParameters, BootstrappingKey, PublicKey, RelinearizationKey, SecretKey,
};
use crate::Result;

/// All the keys of a scheme instance. The secret key stays owned by the
/// set; the evaluation keys are shared through `Arc` handles.
#[derive(Debug)]
pub struct KeySet {
    secret_key: SecretKey,
    public_key: Arc<PublicKey>,
    relinearization_key: Arc<RelinearizationKey>,
    automorphism_keys: Option<Arc<AutomorphismKeys>>,
    bootstrapping_key: Option<Arc<BootstrappingKey>>,
}

impl KeySet {
    /// Generate the secret, public and relinearization keys.
    #[instrument(skip_all)]
    pub fn generate_basic<R: RngCore + CryptoRng>(
        par: &Arc<BgvParameters>,
        rng: &mut R,
    ) -> Result<Self> {
        let secret_key = SecretKey::random(par, rng)?;
        let public_key = Arc::new(PublicKey::new(&secret_key, rng)?);
        let relinearization_key = Arc::new(RelinearizationKey::new(&secret_key, rng)?);
        Ok(Self {
            secret_key,
            public_key,
            relinearization_key,
            automorphism_keys: None,
            bootstrapping_key: None,
        })
    }

    /// Generate all the keys, including the automorphism keys for every
    /// Galois element and the bootstrapping key.
    #[instrument(skip_all)]
    pub fn generate<R: RngCore + CryptoRng>(par: &Arc<BgvParameters>, rng: &mut R) -> Result<Self> {
        let mut keys = Self::generate_basic(par, rng)?;
        keys.automorphism_keys = Some(Arc::new(AutomorphismKeys::all(&keys.secret_key, rng)?));
        keys.bootstrapping_key = Some(Arc::new(BootstrappingKey::new(&keys.secret_key, rng)?));
        Ok(keys)
    }

    /// The secret key.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// The public key.
    pub fn public_key(&self) -> &Arc<PublicKey> {
        &self.public_key
    }

    /// The relinearization key.
    pub fn relinearization_key(&self) -> &Arc<RelinearizationKey> {
        &self.relinearization_key
    }

    /// The automorphism keys, if generated.
    pub fn automorphism_keys(&self) -> Option<&Arc<AutomorphismKeys>> {
        self.automorphism_keys.as_ref()
    }

    /// The bootstrapping key, if generated.
    pub fn bootstrapping_key(&self) -> Option<&Arc<BootstrappingKey>> {
        self.bootstrapping_key.as_ref()
    }
}
