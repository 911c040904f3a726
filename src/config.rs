//! Configuration module
//!
//! Handles loading and parsing of handshake configuration from a TOML file
//! and environment variables. Key components travel as base-10 decimal
//! strings, the same format the key constructors consume.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::crypto::dh::MIN_PRIME_BITS;
use crate::crypto::rsa::RsaKey;

/// Handshake configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KexConfig {
    /// Path the configuration was loaded from
    #[serde(skip)]
    pub config_path: PathBuf,

    /// RSA key configuration
    #[serde(default)]
    pub rsa: RsaConfig,

    /// Bit length of the generated Diffie-Hellman prime
    #[serde(default = "default_dh_prime_bits")]
    pub dh_prime_bits: u64,
}

/// RSA key configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsaConfig {
    /// RSA modulus (N) as a decimal string
    #[serde(default = "default_rsa_modulus")]
    pub modulus: String,

    /// RSA public exponent (E) - typically 65537
    #[serde(default = "default_rsa_public_exponent")]
    pub public_exponent: u64,

    /// RSA private exponent (D) as a decimal string; omit for a
    /// public-only (verifying) deployment
    #[serde(default = "default_rsa_private_exponent")]
    pub private_exponent: Option<String>,

    /// Optional CRT key material, carried alongside the key
    #[serde(default)]
    pub crt: Option<CrtConfig>,
}

/// CRT key material as decimal strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrtConfig {
    pub p: String,
    pub q: String,
    pub dmp1: String,
    pub dmq1: String,
    pub coeff: String,
}

// Default value functions
fn default_dh_prime_bits() -> u64 {
    128
}

fn default_rsa_public_exponent() -> u64 {
    65537
}

// Default RSA key (DEVELOPMENT ONLY - replace in production!)
fn default_rsa_modulus() -> String {
    // 1024-bit modulus for development
    "145825231226752414351168318173938530498564973463253815026114721953197224459396087805761759023003483141941241102059108204820956348329030479346141703758139041410793867096162831147441706538537764047058180180866711557141137116101266958468546005580128164098776406814258619353841252885593670340440641862014310305923".to_string()
}

fn default_rsa_private_exponent() -> Option<String> {
    // Private exponent for development
    Some("111394304757692694503296451054242407378269653272058161674357711295038110504154086147059690586517896402566555583752462487723752043370863067999845768272025170776096045601261121588167304287271170067047334967688981655204772112658985484811959746839688379438361822657660638349530853458752687820850321703123623189433".to_string())
}

impl Default for RsaConfig {
    fn default() -> Self {
        Self {
            modulus: default_rsa_modulus(),
            public_exponent: default_rsa_public_exponent(),
            private_exponent: default_rsa_private_exponent(),
            crt: None,
        }
    }
}

impl Default for KexConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("config/handshake.toml"),
            rsa: RsaConfig::default(),
            dh_prime_bits: default_dh_prime_bits(),
        }
    }
}

impl KexConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        // Determine config path from environment or use default
        let config_path = env::var("RETROKEX_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/handshake.toml"));

        // Try to load from file
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            toml::from_str(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.config_path = config_path;

        // Override with environment variables
        config.apply_env_overrides();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // RSA overrides (from secure environment)
        if let Ok(val) = env::var("RETROKEX_RSA_MODULUS") {
            self.rsa.modulus = val;
        }
        if let Ok(val) = env::var("RETROKEX_RSA_PUBLIC_EXPONENT") {
            if let Ok(e) = val.parse() {
                self.rsa.public_exponent = e;
            }
        }
        if let Ok(val) = env::var("RETROKEX_RSA_PRIVATE_EXPONENT") {
            self.rsa.private_exponent = if val.is_empty() { None } else { Some(val) };
        }
        if let Ok(val) = env::var("RETROKEX_DH_PRIME_BITS") {
            if let Ok(bits) = val.parse() {
                self.dh_prime_bits = bits;
            }
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.dh_prime_bits < MIN_PRIME_BITS || self.dh_prime_bits > 4096 {
            anyhow::bail!(
                "DH prime bit length must be between {} and 4096",
                MIN_PRIME_BITS
            );
        }

        if self.rsa.public_exponent == 0 {
            anyhow::bail!("RSA public exponent must be non-zero");
        }

        if !is_decimal(&self.rsa.modulus) {
            anyhow::bail!("RSA modulus must be a base-10 integer string");
        }
        if let Some(d) = &self.rsa.private_exponent {
            if !is_decimal(d) {
                anyhow::bail!("RSA private exponent must be a base-10 integer string");
            }
        }
        if let Some(crt) = &self.rsa.crt {
            if self.rsa.private_exponent.is_none() {
                anyhow::bail!("CRT components require a private exponent");
            }
            let components = [&crt.p, &crt.q, &crt.dmp1, &crt.dmq1, &crt.coeff];
            if !components.iter().all(|c| is_decimal(c)) {
                anyhow::bail!("CRT components must be base-10 integer strings");
            }
        }

        Ok(())
    }

    /// Build the RSA key described by this configuration
    pub fn build_key(&self) -> crate::error::Result<RsaKey> {
        let e = self.rsa.public_exponent.to_string();
        match (&self.rsa.private_exponent, &self.rsa.crt) {
            (Some(d), Some(crt)) => RsaKey::private_from_decimal_crt(
                &self.rsa.modulus,
                &e,
                d,
                &crt.p,
                &crt.q,
                &crt.dmp1,
                &crt.dmq1,
                &crt.coeff,
            ),
            (Some(d), None) => RsaKey::private_from_decimal(&self.rsa.modulus, &e, d),
            (None, _) => RsaKey::public_from_decimal(&self.rsa.modulus, &e),
        }
    }
}

fn is_decimal(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
