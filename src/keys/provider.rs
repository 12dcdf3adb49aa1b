//! Signing key provisioning.
//!
//! The provider loads the RSA key pair from the key store, or generates and
//! persists one outside production. Provisioning happens at most once per
//! provider; concurrent first callers block on the same initialization and
//! all observe its result.

use crate::config::{Config, KeyStoreConfig, RuntimeMode};
use crate::error::TokenError;
use crate::keys::material::KeyMaterial;
use crate::metrics;
use once_cell::sync::OnceCell;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

/// Owns the process signing key.
pub struct KeyMaterialProvider {
    key_store: KeyStoreConfig,
    runtime_mode: RuntimeMode,
    material: OnceCell<Arc<KeyMaterial>>,
}

impl KeyMaterialProvider {
    /// Provider backed by `key_store`.
    #[must_use]
    pub fn new(key_store: KeyStoreConfig, runtime_mode: RuntimeMode) -> Self {
        Self {
            key_store,
            runtime_mode,
            material: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.key_store.clone(), config.runtime_mode.clone())
    }

    /// Provider that serves already-built material and never touches disk.
    #[must_use]
    pub fn with_key_material(material: KeyMaterial) -> Self {
        Self {
            key_store: KeyStoreConfig::default(),
            runtime_mode: RuntimeMode::Production,
            material: OnceCell::with_value(Arc::new(material)),
        }
    }

    /// Provision eagerly, typically at startup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_key_material`].
    pub fn initialize(&self) -> Result<(), TokenError> {
        self.get_key_material().map(|_| ())
    }

    /// Current key material, provisioning it on first use.
    ///
    /// A failed provisioning is not cached; the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns `KeyProvisioning` when the key pair is missing in production
    /// or any load, decode, generation or write step fails.
    pub fn get_key_material(&self) -> Result<Arc<KeyMaterial>, TokenError> {
        self.material
            .get_or_try_init(|| self.provision().map(Arc::new))
            .cloned()
    }

    /// Whether key material has been provisioned.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.material.get().is_some()
    }

    fn provision(&self) -> Result<KeyMaterial, TokenError> {
        let private_path = self.key_store.private_key_path();
        let public_path = self.key_store.public_key_path();
        let private_exists = private_path.exists();
        let public_exists = public_path.exists();

        if private_exists && public_exists {
            info!(
                private_key = %private_path.display(),
                public_key = %public_path.display(),
                "RSA keys already exist, loading from key store"
            );
            let result = Self::load(&private_path, &public_path);
            metrics::record_key_provisioning("loaded", result.is_ok());
            return match result {
                Ok(material) => {
                    info!(kid = %material.key_id(), "Loaded signing key");
                    Ok(material)
                }
                Err(e) => {
                    error!(error = %e, "Failed to load signing key");
                    Err(e)
                }
            };
        }

        if self.runtime_mode.is_production() {
            metrics::record_key_provisioning("missing", false);
            error!(
                directory = %self.key_store.directory.display(),
                "RSA key pair missing in production"
            );
            return Err(TokenError::key_provisioning(format!(
                "Private and public keys do not exist in {} (production mode)",
                self.key_store.directory.display()
            )));
        }

        if private_exists || public_exists {
            warn!(
                directory = %self.key_store.directory.display(),
                "Incomplete key pair in key store, regenerating both halves"
            );
        }

        info!(
            runtime_mode = %self.runtime_mode,
            private_key = %private_path.display(),
            public_key = %public_path.display(),
            "Generating new RSA key pair"
        );
        let result = self.generate_and_persist(&private_path, &public_path);
        metrics::record_key_provisioning("generated", result.is_ok());
        match result {
            Ok(material) => {
                info!(kid = %material.key_id(), "Generated signing key");
                Ok(material)
            }
            Err(e) => {
                error!(error = %e, "Failed to generate signing key");
                Err(e)
            }
        }
    }

    fn load(private_path: &Path, public_path: &Path) -> Result<KeyMaterial, TokenError> {
        let private_der = Zeroizing::new(fs::read(private_path).map_err(|e| {
            TokenError::key_provisioning(format!(
                "Cannot read {}: {}",
                private_path.display(),
                e
            ))
        })?);
        let public_der = fs::read(public_path).map_err(|e| {
            TokenError::key_provisioning(format!("Cannot read {}: {}", public_path.display(), e))
        })?;

        KeyMaterial::from_der(&private_der, &public_der)
    }

    fn generate_and_persist(
        &self,
        private_path: &Path,
        public_path: &Path,
    ) -> Result<KeyMaterial, TokenError> {
        ensure_directory(&self.key_store.directory)?;

        let material = KeyMaterial::generate()?;
        write_key_file(private_path, &material.private_key_der()?, true)?;
        write_key_file(public_path, &material.public_key_der()?, false)?;

        Ok(material)
    }
}

fn ensure_directory(directory: &Path) -> Result<(), TokenError> {
    if directory.exists() {
        return Ok(());
    }
    fs::create_dir_all(directory).map_err(|e| {
        TokenError::key_provisioning(format!(
            "Cannot create key directory {}: {}",
            directory.display(),
            e
        ))
    })?;
    info!(directory = %directory.display(), "Created keys directory");
    Ok(())
}

fn write_key_file(path: &Path, der: &[u8], private: bool) -> Result<(), TokenError> {
    let io_error = |e: std::io::Error| {
        TokenError::key_provisioning(format!("Cannot write {}: {}", path.display(), e))
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        if private {
            options.mode(0o600);
            // mode only applies on creation; a leftover file keeps its bits
            if path.exists() {
                fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(io_error)?;
            }
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    let mut file = options.open(path).map_err(io_error)?;
    file.write_all(der).map_err(io_error)?;
    file.sync_all().map_err(io_error)?;
    Ok(())
}
