//! Extension dispatch.
//!
//! Every entity may carry named extensions. A registered handler parses the
//! extension into a typed structure; otherwise the payload is kept as a
//! dynamic value tree; a disabled extension is dropped during parsing.
//! Both representations live in the owning entity's extension map, keyed by
//! the extension name.

use std::collections::HashMap;

use crate::json::reader::{EventSource, ReadContext};
use crate::json::value::JsonValue;
use crate::util::Result;

mod basisu;
mod draco;
mod meshopt;
mod rtc;

pub use basisu::TextureBasisu;
pub use draco::DracoMeshCompression;
pub use meshopt::{MeshoptCompression, MeshoptFilter, MeshoptMode};
pub use rtc::CesiumRtc;

/// The kind of entity an extension is attached to. Builtin handlers are
/// registered against a specific kind; the same extension name on any other
/// kind is kept generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Model,
    Asset,
    Scene,
    Node,
    Mesh,
    MeshPrimitive,
    Accessor,
    AccessorSparse,
    SparseIndices,
    SparseValues,
    Buffer,
    BufferView,
    Image,
    Sampler,
    Texture,
    Material,
    PbrMetallicRoughness,
    TextureInfo,
    Extension,
}

/// Per-name parsing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionState {
    /// Parse into the typed structure where a handler exists.
    Registered,
    /// Always materialize into the dynamic value tree.
    JsonOnly,
    /// Drop the extension entirely.
    Disabled,
}

/// One parsed extension attached to an entity.
#[derive(Debug, Clone)]
pub enum ExtensionValue {
    Typed(TypedExtension),
    Generic(JsonValue),
}

/// The closed set of extensions with builtin typed handlers.
#[derive(Debug, Clone)]
pub enum TypedExtension {
    DracoMeshCompression(DracoMeshCompression),
    MeshoptCompression(MeshoptCompression),
    CesiumRtc(CesiumRtc),
    TextureBasisu(TextureBasisu),
}

/// A typed extension structure that knows its wire name and how to recover
/// itself from the stored [`ExtensionValue`].
pub trait ExtensionType: Sized {
    const NAME: &'static str;
    fn from_extension(value: &ExtensionValue) -> Option<&Self>;
}

/// Handler signature for builtin typed extensions.
pub type ExtensionParser =
    fn(&mut EventSource<'_>, &mut ReadContext<'_>) -> Result<TypedExtension>;

struct BuiltinExtension {
    name: &'static str,
    kind: EntityKind,
    parse: ExtensionParser,
}

/// How a single extension encountered during parsing is to be handled.
#[derive(Clone, Copy)]
pub enum Resolution {
    Typed(ExtensionParser),
    Generic,
    Skip,
}

/// Maps extension names to handlers and per-name policy overrides.
///
/// The registry lives on the reader; state changes affect subsequent reads
/// only. Name lookup is case-sensitive and exact.
pub struct ExtensionRegistry {
    states: HashMap<String, ExtensionState>,
    builtins: Vec<BuiltinExtension>,
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
            builtins: vec![
                BuiltinExtension {
                    name: DracoMeshCompression::NAME,
                    kind: EntityKind::MeshPrimitive,
                    parse: draco::parse,
                },
                BuiltinExtension {
                    name: MeshoptCompression::NAME,
                    kind: EntityKind::MeshPrimitive,
                    parse: meshopt::parse,
                },
                BuiltinExtension {
                    name: CesiumRtc::NAME,
                    kind: EntityKind::Model,
                    parse: rtc::parse,
                },
                BuiltinExtension {
                    name: TextureBasisu::NAME,
                    kind: EntityKind::Texture,
                    parse: basisu::parse,
                },
            ],
        }
    }
}

impl ExtensionRegistry {
    /// Override the handling policy for one extension name.
    pub fn set_state(&mut self, name: impl Into<String>, state: ExtensionState) {
        self.states.insert(name.into(), state);
    }

    /// The explicit override for a name, if any.
    pub fn state(&self, name: &str) -> Option<ExtensionState> {
        self.states.get(name).copied()
    }

    #[inline]
    pub fn is_disabled(&self, name: &str) -> bool {
        self.state(name) == Some(ExtensionState::Disabled)
    }

    /// Whether any builtin handler exists for this name, on any entity kind.
    pub fn has_builtin(&self, name: &str) -> bool {
        self.builtins.iter().any(|b| b.name == name)
    }

    /// Resolve the handling of an extension encountered on an entity.
    pub fn resolve(&self, name: &str, kind: EntityKind) -> Resolution {
        match self.states.get(name) {
            Some(ExtensionState::Disabled) => Resolution::Skip,
            Some(ExtensionState::JsonOnly) => Resolution::Generic,
            Some(ExtensionState::Registered) | None => {
                match self
                    .builtins
                    .iter()
                    .find(|b| b.name == name && b.kind == kind)
                {
                    Some(builtin) => Resolution::Typed(builtin.parse),
                    None => Resolution::Generic,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resolution_uses_builtins() {
        let registry = ExtensionRegistry::default();
        assert!(matches!(
            registry.resolve("KHR_draco_mesh_compression", EntityKind::MeshPrimitive),
            Resolution::Typed(_)
        ));
        // Same name on a different owner stays generic.
        assert!(matches!(
            registry.resolve("KHR_draco_mesh_compression", EntityKind::Node),
            Resolution::Generic
        ));
        assert!(matches!(
            registry.resolve("VENDOR_unknown", EntityKind::Model),
            Resolution::Generic
        ));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut registry = ExtensionRegistry::default();
        registry.set_state("KHR_draco_mesh_compression", ExtensionState::JsonOnly);
        assert!(matches!(
            registry.resolve("KHR_draco_mesh_compression", EntityKind::MeshPrimitive),
            Resolution::Generic
        ));
        registry.set_state("KHR_draco_mesh_compression", ExtensionState::Disabled);
        assert!(matches!(
            registry.resolve("KHR_draco_mesh_compression", EntityKind::MeshPrimitive),
            Resolution::Skip
        ));
        registry.set_state("KHR_draco_mesh_compression", ExtensionState::Registered);
        assert!(matches!(
            registry.resolve("KHR_draco_mesh_compression", EntityKind::MeshPrimitive),
            Resolution::Typed(_)
        ));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = ExtensionRegistry::default();
        assert!(registry.has_builtin("CESIUM_RTC"));
        assert!(!registry.has_builtin("cesium_rtc"));
    }
}
