//! # Compiled Schema Cache
//!
//! Reflecting and compiling a schema is pure and idempotent, so the result
//! for a given target type and reflector configuration can be shared across
//! decode calls and threads.
//!
//! The cache is read-mostly: lookups take a shared `parking_lot` read lock;
//! a miss compiles outside any lock and then inserts under the write lock.
//! Two threads racing on the same miss both compile, and the first insert wins.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use lenient_core::{DescriptorFn, TypeOverride};
use parking_lot::RwLock;

use crate::reflect::SchemaReflector;
use crate::validate::{ValidateError, Validator};

/// Identity of a compiled schema: target type plus every reflector setting
/// that changes the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    type_id: TypeId,
    deny_additional_properties: bool,
    overrides: Vec<TypeOverride>,
}

impl CacheKey {
    pub fn new(type_id: TypeId, reflector: &SchemaReflector) -> Self {
        let mut overrides = reflector.overrides().to_vec();
        overrides.sort();
        overrides.dedup();
        Self {
            type_id,
            deny_additional_properties: reflector.denies_additional_properties(),
            overrides,
        }
    }
}

/// Shared map from [`CacheKey`] to compiled [`Validator`].
#[derive(Debug, Default)]
pub struct SchemaCache {
    validators: RwLock<HashMap<CacheKey, Arc<Validator>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by the decoder.
    pub fn global() -> &'static SchemaCache {
        static GLOBAL: OnceLock<SchemaCache> = OnceLock::new();
        GLOBAL.get_or_init(SchemaCache::new)
    }

    /// Returns the cached validator for `type_id` under `reflector`,
    /// reflecting `describe()` and compiling it on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::SchemaCompile`] if the reflected schema does
    /// not compile. Failures are not cached.
    pub fn get_or_compile(
        &self,
        type_id: TypeId,
        describe: DescriptorFn,
        reflector: &SchemaReflector,
    ) -> Result<Arc<Validator>, ValidateError> {
        let key = CacheKey::new(type_id, reflector);
        if let Some(found) = self.validators.read().get(&key) {
            tracing::debug!(root = found.schema().root(), "schema cache hit");
            return Ok(Arc::clone(found));
        }

        let compiled = Arc::new(Validator::new(reflector.reflect(&describe()))?);
        let mut validators = self.validators.write();
        Ok(Arc::clone(validators.entry(key).or_insert(compiled)))
    }

    pub fn len(&self) -> usize {
        self.validators.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.read().is_empty()
    }

    pub fn clear(&self) {
        self.validators.write().clear();
    }
}
