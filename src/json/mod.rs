//! Schema-driven JSON reading.
//!
//! - [`lexer`] - Streaming lexer producing structural events
//! - [`value`] - Dynamic value tree with lossless numeric coercions
//! - [`reader`] - Generic object-reading framework over the event stream

pub mod lexer;
pub mod reader;
pub mod value;

pub use lexer::{Event, Lexer, Number};
pub use reader::{EventSource, GltfObject, NamedEnum, ReadContext};
pub use value::{JsonObject, JsonValue, SafeNumber};
