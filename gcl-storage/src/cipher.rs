//! Payload cipher capability.
//!
//! The encrypt-vs-plain decision is a strategy value chosen once when the
//! engine is built: `GpgCipher` when recipients are configured,
//! `PassthroughCipher` otherwise. The executor never inspects which one it
//! holds.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Byte-for-byte payload transform applied around store transfers.
#[async_trait]
pub trait Cipher: Send + Sync {
    async fn encrypt(&self, plaintext: &[u8], recipients: &[String]) -> StorageResult<Vec<u8>>;

    async fn decrypt(&self, ciphertext: &[u8]) -> StorageResult<Vec<u8>>;
}

/// No-encryption strategy used when no recipients are configured.
#[derive(Debug, Default)]
pub struct PassthroughCipher;

#[async_trait]
impl Cipher for PassthroughCipher {
    async fn encrypt(&self, plaintext: &[u8], _recipients: &[String]) -> StorageResult<Vec<u8>> {
        Ok(plaintext.to_vec())
    }

    async fn decrypt(&self, ciphertext: &[u8]) -> StorageResult<Vec<u8>> {
        Ok(ciphertext.to_vec())
    }
}

/// Cipher backed by the `gpg` binary.
#[derive(Debug)]
pub struct GpgCipher {
    binary: String,
}

impl GpgCipher {
    pub fn new() -> Self {
        Self {
            binary: "gpg".to_string(),
        }
    }

    /// Uses an explicit gpg binary path.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[String], input: &[u8]) -> StorageResult<Vec<u8>> {
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StorageError::Cipher(format!("cannot spawn {}: {e}", self.binary)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input)
                .await
                .map_err(|e| StorageError::Cipher(format!("gpg stdin write failed: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| StorageError::Cipher(format!("gpg did not exit cleanly: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StorageError::Cipher(format!(
                "gpg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

impl Default for GpgCipher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cipher for GpgCipher {
    async fn encrypt(&self, plaintext: &[u8], recipients: &[String]) -> StorageResult<Vec<u8>> {
        if recipients.is_empty() {
            return Err(StorageError::Cipher(
                "encryption requested without recipients".to_string(),
            ));
        }

        let mut args = vec![
            "--batch".to_string(),
            "--yes".to_string(),
            "--encrypt".to_string(),
        ];
        for recipient in recipients {
            args.push("--recipient".to_string());
            args.push(recipient.clone());
        }
        args.push("--output".to_string());
        args.push("-".to_string());

        self.run(&args, plaintext).await
    }

    async fn decrypt(&self, ciphertext: &[u8]) -> StorageResult<Vec<u8>> {
        let args = vec![
            "--batch".to_string(),
            "--quiet".to_string(),
            "--decrypt".to_string(),
        ];
        self.run(&args, ciphertext).await
    }
}
