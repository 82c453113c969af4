use alloy::{
    network::EthereumWallet,
    signers::{
        local::{LocalSigner, PrivateKeySigner},
        Signer,
    },
};
use eyre::{bail, eyre, Context, Result};
use std::fs;

use crate::config::PrivateKey;

impl PrivateKey {
    /// Builds a wallet signing for `chain_id` from the first configured key
    /// source: raw key, key file, then keystore.
    pub fn wallet(&self, chain_id: u64) -> Result<EthereumWallet> {
        let signer = self.signer()?.with_chain_id(Some(chain_id));
        Ok(EthereumWallet::new(signer))
    }

    fn signer(&self) -> Result<PrivateKeySigner> {
        if let Some(key) = &self.private_key {
            return parse_key(key);
        }

        if let Some(file) = &self.private_key_path {
            let key = fs::read_to_string(file).wrap_err("could not open private key file")?;
            return parse_key(&key);
        }

        let keystore = self
            .keystore_path
            .as_ref()
            .ok_or(eyre!("no private key or keystore configured"))?;
        let password = self
            .keystore_password_path
            .as_ref()
            .map(fs::read_to_string)
            .unwrap_or(Ok("".into()))
            .wrap_err("could not read keystore password file")?;

        LocalSigner::decrypt_keystore(keystore, password.trim_end())
            .wrap_err("could not decrypt keystore")
    }
}

fn parse_key(key: &str) -> Result<PrivateKeySigner> {
    let key = key.trim();
    if key.is_empty() {
        bail!("empty private key");
    }
    key.parse::<PrivateKeySigner>()
        .wrap_err("invalid private key")
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    // First default anvil account.
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn no_key() -> PrivateKey {
        PrivateKey {
            private_key: None,
            private_key_path: None,
            keystore_path: None,
            keystore_password_path: None,
        }
    }

    #[test]
    fn signer_from_raw_key() {
        let auth = PrivateKey {
            private_key: Some(KEY.into()),
            ..no_key()
        };
        let signer = auth.signer().unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn signer_from_key_file_ignores_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.txt");
        fs::write(&path, format!("{KEY}\n")).unwrap();

        let auth = PrivateKey {
            private_key_path: Some(path),
            ..no_key()
        };
        let signer = auth.signer().unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn empty_key_is_rejected() {
        let auth = PrivateKey {
            private_key: Some("  ".into()),
            ..no_key()
        };
        let err = auth.signer().unwrap_err();
        assert!(err.to_string().contains("empty private key"));
    }

    #[test]
    fn missing_key_source_is_rejected() {
        let err = no_key().wallet(1).unwrap_err();
        assert!(err.to_string().contains("no private key or keystore"));
    }
}
