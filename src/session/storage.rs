//! Client-Side Storage Abstractions
//!
//! Traits standing in for the browser's localStorage and cookie jar, plus
//! the encrypted wrapper every persisted value goes through. Write
//! operations are fallible so logout can swallow-and-log individual
//! failures instead of aborting.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};

use crate::session::cookie::CookieAttributes;
use crate::shared::crypto::SecureCodec;

/// Storage operation error
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

pub type StoreResult = Result<(), StoreError>;

/// Durable key-value storage (localStorage stand-in).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> StoreResult;
    fn remove(&mut self, key: &str) -> StoreResult;
    fn keys(&self) -> Vec<String>;
}

/// Cookie storage (document.cookie stand-in).
pub trait CookieJar {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, name: &str, value: &str, attrs: &CookieAttributes) -> StoreResult;
    fn remove(&mut self, name: &str) -> StoreResult;
}

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// In-memory cookie jar.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: HashMap<String, (String, CookieAttributes)>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes the named cookie was last set with.
    pub fn attributes(&self, name: &str) -> Option<&CookieAttributes> {
        self.cookies.get(name).map(|(_, attrs)| attrs)
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies.get(name).map(|(value, _)| value.clone())
    }

    fn set(&mut self, name: &str, value: &str, attrs: &CookieAttributes) -> StoreResult {
        self.cookies
            .insert(name.to_string(), (value.to_string(), attrs.clone()));
        Ok(())
    }

    fn remove(&mut self, name: &str) -> StoreResult {
        self.cookies.remove(name);
        Ok(())
    }
}

/// Encrypting wrapper over a [`KeyValueStore`].
///
/// Every value is an opaque AES-256-GCM blob; reads are fail closed, so a
/// corrupted or foreign entry reads as absent.
pub struct SecureStore {
    inner: Box<dyn KeyValueStore>,
    codec: SecureCodec,
}

impl SecureStore {
    pub fn new(inner: Box<dyn KeyValueStore>, codec: SecureCodec) -> Self {
        Self { inner, codec }
    }

    /// Decrypt and deserialize the value under `key`. Fail closed.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let blob = self.inner.get(key)?;
        self.codec.decrypt_json(&blob)
    }

    /// Serialize, encrypt, and persist `value` under `key`.
    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> StoreResult {
        let blob = self
            .codec
            .encrypt_json(value)
            .map_err(|e| StoreError(e.to_string()))?;
        self.inner.set(key, &blob)
    }

    pub fn remove(&mut self, key: &str) -> StoreResult {
        self.inner.remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}
