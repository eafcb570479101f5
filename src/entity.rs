//! Concrete entity types and the runtime token used to ask for one.
//!
//! Every concrete type wraps a [`Record`] whose schema and table are fixed when
//! the value is constructed. The full set is declared once in the
//! `record_entities!` invocation at the bottom of this file, which also feeds
//! [`register_default_entities`].

use std::any::{Any, TypeId};
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::core::models::Record;
use crate::registry::EntityRegistryBuilder;

/// Object-safe view of a record-backed entity.
pub trait Entity: Any + Send + Sync + fmt::Debug {
    /// Logical name the entity is registered under.
    fn entity_name(&self) -> &'static str;

    /// Fully qualified Rust type name, written to documents as the discriminator.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl dyn Entity {
    /// Borrow as the concrete type `T` if that is what this entity is.
    #[must_use]
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[must_use]
    pub fn is<T: Entity>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Static side of a concrete entity: its constants and how to build an empty one.
pub trait EntityKind: Entity + Default {
    const ENTITY_NAME: &'static str;
    const SCHEMA_NAME: &'static str;
    const TABLE_NAME: &'static str;
}

/// Runtime type token handed to the read converter and the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityType {
    id: TypeId,
    type_name: &'static str,
    entity_name: &'static str,
    schema: &'static str,
    table: &'static str,
}

impl EntityType {
    #[must_use]
    pub fn of<T: EntityKind>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            entity_name: T::ENTITY_NAME,
            schema: T::SCHEMA_NAME,
            table: T::TABLE_NAME,
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    #[must_use]
    pub fn schema(&self) -> &'static str {
        self.schema
    }

    #[must_use]
    pub fn table(&self) -> &'static str {
        self.table
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

// A bare record is an entity too, so unspecialised input can flow through the
// same APIs. It is never registered.
impl Entity for Record {
    fn entity_name(&self) -> &'static str {
        "Record"
    }

    fn record(&self) -> &Record {
        self
    }

    fn record_mut(&mut self) -> &mut Record {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

macro_rules! record_entities {
    ($( $(#[$meta:meta])* $name:ident => ($schema:literal, $table:literal) ),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub struct $name(Record);

            impl $name {
                pub const ENTITY_NAME: &'static str = stringify!($name);
                pub const SCHEMA_NAME: &'static str = $schema;
                pub const TABLE_NAME: &'static str = $table;

                #[must_use]
                pub fn new() -> Self {
                    Self::default()
                }

                #[must_use]
                pub fn into_record(self) -> Record {
                    self.0
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self(Record::located($schema, $table))
                }
            }

            impl Deref for $name {
                type Target = Record;

                fn deref(&self) -> &Record {
                    &self.0
                }
            }

            impl DerefMut for $name {
                fn deref_mut(&mut self) -> &mut Record {
                    &mut self.0
                }
            }

            impl Entity for $name {
                fn entity_name(&self) -> &'static str {
                    Self::ENTITY_NAME
                }

                fn record(&self) -> &Record {
                    &self.0
                }

                fn record_mut(&mut self) -> &mut Record {
                    &mut self.0
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn into_any(self: Box<Self>) -> Box<dyn Any> {
                    self
                }
            }

            impl EntityKind for $name {
                const ENTITY_NAME: &'static str = stringify!($name);
                const SCHEMA_NAME: &'static str = $schema;
                const TABLE_NAME: &'static str = $table;
            }
        )+

        /// Register every entity type declared in this module.
        #[must_use]
        pub fn register_default_entities(builder: EntityRegistryBuilder) -> EntityRegistryBuilder {
            builder $( .register::<$name>() )+
        }
    };
}

record_entities! {
    Specialty => ("tcs", "Specialty"),
    Placement => ("tcs", "Placement"),
    PlacementSite => ("tcs", "PlacementSite"),
    PlacementSpecialty => ("tcs", "PlacementSpecialty"),
    Post => ("tcs", "Post"),
    PostSpecialty => ("tcs", "PostSpecialty"),
    Programme => ("tcs", "Programme"),
    Curriculum => ("tcs", "Curriculum"),
    CurriculumMembership => ("tcs", "CurriculumMembership"),
    ConditionsOfJoining => ("tcs", "ConditionsOfJoining"),
    LocalOffice => ("reference", "LocalOffice"),
    Grade => ("reference", "Grade"),
    Site => ("reference", "Site"),
    Trust => ("reference", "Trust"),
    /// Designated body code reference data; the source table name is upper case.
    Dbc => ("reference", "DBC"),
    HeeUser => ("auth", "HeeUser"),
    UserRole => ("auth", "UserRole"),
    UserDesignatedBody => ("auth", "UserDesignatedBody"),
}
