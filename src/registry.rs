//! Start-up populated table of entity factories.
//!
//! The registry is built once through [`EntityRegistryBuilder`] and is
//! read-only afterwards. Share it with `Arc`; lookups need no locking.

use std::any::TypeId;
use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::core::models::Record;
use crate::entity::{self, Entity, EntityKind, EntityType};
use crate::errors::SyncError;

type Factory = fn() -> Box<dyn Entity>;

fn construct<T: EntityKind>() -> Box<dyn Entity> {
    Box::new(T::default())
}

#[derive(Clone, Copy)]
struct Registration {
    entity_type: EntityType,
    factory: Factory,
}

#[derive(Default)]
pub struct EntityRegistryBuilder {
    registrations: Vec<Registration>,
}

impl EntityRegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a factory for `T`. Registering the same type twice keeps the first entry.
    #[must_use]
    pub fn register<T: EntityKind>(mut self) -> Self {
        let entity_type = EntityType::of::<T>();
        if self
            .registrations
            .iter()
            .any(|r| r.entity_type.id() == entity_type.id())
        {
            warn!(entity = entity_type.entity_name(), "Entity type registered twice, ignoring");
            return self;
        }
        self.registrations.push(Registration {
            entity_type,
            factory: construct::<T>,
        });
        self
    }

    #[must_use]
    pub fn build(self) -> EntityRegistry {
        let mut by_type = HashMap::with_capacity(self.registrations.len());
        let mut by_type_name = HashMap::with_capacity(self.registrations.len());
        let mut by_name = HashMap::with_capacity(self.registrations.len() * 2);

        for registration in self.registrations {
            let entity_type = registration.entity_type;
            by_type_name.insert(entity_type.type_name(), entity_type.id());
            by_name
                .entry(entity_type.entity_name())
                .or_insert(entity_type.id());
            by_name.entry(entity_type.table()).or_insert(entity_type.id());
            by_type.insert(entity_type.id(), registration);
        }

        info!(entity_types = by_type.len(), "Entity registry populated");
        EntityRegistry {
            by_type,
            by_type_name,
            by_name,
        }
    }
}

/// Maps entity type identity to a fresh-instance factory.
pub struct EntityRegistry {
    by_type: HashMap<TypeId, Registration>,
    by_type_name: HashMap<&'static str, TypeId>,
    by_name: HashMap<&'static str, TypeId>,
}

impl EntityRegistry {
    #[must_use]
    pub fn builder() -> EntityRegistryBuilder {
        EntityRegistryBuilder::new()
    }

    /// A registry holding every entity type the crate declares.
    #[must_use]
    pub fn with_default_entities() -> Self {
        entity::register_default_entities(Self::builder()).build()
    }

    /// Construct a new, empty instance of `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ResolutionError`] when `target` was never registered.
    pub fn resolve(&self, target: EntityType) -> Result<Box<dyn Entity>, SyncError> {
        self.by_type
            .get(&target.id())
            .map(|registration| (registration.factory)())
            .ok_or_else(|| SyncError::ResolutionError(target.type_name().to_string()))
    }

    /// Typed form of [`EntityRegistry::resolve`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ResolutionError`] when `T` was never registered.
    pub fn resolve_as<T: EntityKind>(&self) -> Result<T, SyncError> {
        let target = EntityType::of::<T>();
        let instance = self.resolve(target)?;
        instance
            .into_any()
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| SyncError::ResolutionError(target.type_name().to_string()))
    }

    /// Resolve using a discriminator written by the write converter.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ResolutionError`] when no registered type has that name.
    pub fn resolve_by_type_name(&self, type_name: &str) -> Result<Box<dyn Entity>, SyncError> {
        let id = self
            .by_type_name
            .get(type_name)
            .ok_or_else(|| SyncError::ResolutionError(type_name.to_string()))?;
        self.resolve_id(*id, type_name)
    }

    /// Resolve using a logical entity or table name, e.g. `Specialty` or `DBC`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ResolutionError`] when no registered type matches.
    pub fn resolve_by_name(&self, name: &str) -> Result<Box<dyn Entity>, SyncError> {
        let id = self
            .by_name
            .get(name)
            .ok_or_else(|| SyncError::ResolutionError(name.to_string()))?;
        self.resolve_id(*id, name)
    }

    fn resolve_id(&self, id: TypeId, requested: &str) -> Result<Box<dyn Entity>, SyncError> {
        self.by_type
            .get(&id)
            .map(|registration| (registration.factory)())
            .ok_or_else(|| SyncError::ResolutionError(requested.to_string()))
    }

    /// Re-home a generic record into the concrete type registered for its table.
    ///
    /// Records with no registered type come back as the generic record.
    #[must_use]
    pub fn specialise(&self, record: Record) -> Box<dyn Entity> {
        match self.resolve_by_name(record.table()) {
            Ok(mut target) => {
                target.record_mut().copy_contents_from(&record);
                target
            }
            Err(_) => {
                debug!(table = record.table(), "No Record child type found");
                Box::new(record)
            }
        }
    }

    #[must_use]
    pub fn contains(&self, target: EntityType) -> bool {
        self.by_type.contains_key(&target.id())
    }

    pub fn entity_types(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.by_type.values().map(|r| r.entity_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.entity_types().map(|t| t.entity_name()).collect();
        names.sort_unstable();
        f.debug_struct("EntityRegistry")
            .field("entity_types", &names)
            .finish()
    }
}
