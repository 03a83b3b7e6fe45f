// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types

use std::fmt;

use crate::component::ComponentTypeId;
use crate::entity::EntityId;

/// ECS error type
#[derive(Debug, Clone, PartialEq)]
pub enum EcsError {
    /// Operation referenced an entity that is not in the live set
    UnknownEntity(EntityId),

    /// A component could not be replaced because a running action holds a borrow of it
    ComponentBorrowed {
        entity: EntityId,
        component: ComponentTypeId,
    },

    /// A system action needed state that is only available after `setup`
    SystemNotSetUp(&'static str),

    /// IO error (file operations, etc.)
    IoError(String),

    /// Serialization error
    SerializationError(String),

    /// Deserialization error
    DeserializationError(String),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::UnknownEntity(entity) => write!(f, "Unknown entity: {entity}"),
            EcsError::ComponentBorrowed { entity, component } => {
                write!(f, "Component {component} of entity {entity} is currently borrowed")
            }
            EcsError::SystemNotSetUp(name) => write!(f, "System {name} was run before setup"),
            EcsError::IoError(msg) => write!(f, "IO error: {msg}"),
            EcsError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            EcsError::DeserializationError(msg) => write!(f, "Deserialization error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<std::io::Error> for EcsError {
    fn from(err: std::io::Error) -> Self {
        EcsError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for EcsError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            EcsError::IoError(err.to_string())
        } else {
            EcsError::DeserializationError(err.to_string())
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
