//! Schema-driven object reading on top of the event stream.
//!
//! Each typed entity implements [`GltfObject`]; a single generic driver
//! walks the event stream, dispatches known properties to the entity,
//! captures `extras`, routes `extensions` through the registry, and applies
//! the shared unknown-property policy. Handlers never fail on unexpected
//! document shapes: they record a warning naming the path and leave the
//! field at its default. Only structural JSON errors propagate as
//! [`Error`].

use indexmap::IndexMap;

use crate::extensions::{EntityKind, ExtensionRegistry, ExtensionValue, Resolution};
use crate::json::lexer::{Event, Lexer, Number};
use crate::json::value::{JsonObject, JsonValue};
use crate::model::EntityCommon;
use crate::util::{Error, Result};

impl From<Number> for JsonValue {
    fn from(n: Number) -> Self {
        if let Some(i) = n.int {
            JsonValue::Int(i)
        } else if let Some(u) = n.uint {
            JsonValue::Uint(u)
        } else {
            JsonValue::Double(n.float)
        }
    }
}

/// Event stream over a JSON byte span.
pub struct EventSource<'a> {
    lexer: Lexer<'a>,
}

impl<'a> EventSource<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    #[inline]
    pub fn next(&mut self) -> Result<Option<Event<'a>>> {
        self.lexer.next()
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.lexer.offset()
    }

    fn err_eof(&self) -> Error {
        Error::malformed(self.lexer.offset(), "unexpected end of input")
    }
}

#[derive(Debug)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// Shared state for one document parse: diagnostics, the current JSON path,
/// the unknown-property policy and the extension registry.
pub struct ReadContext<'a> {
    pub capture_unknown: bool,
    pub registry: &'a ExtensionRegistry,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    path: Vec<PathSegment>,
}

impl<'a> ReadContext<'a> {
    pub fn new(registry: &'a ExtensionRegistry, capture_unknown: bool) -> Self {
        Self {
            capture_unknown,
            registry,
            warnings: Vec::new(),
            errors: Vec::new(),
            path: Vec::new(),
        }
    }

    pub fn push_key(&mut self, key: &str) {
        self.path.push(PathSegment::Key(key.to_string()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.path.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// Render the current path, e.g. `/accessors/0/componentType`.
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for segment in &self.path {
            out.push('/');
            match segment {
                PathSegment::Key(k) => out.push_str(k),
                PathSegment::Index(i) => out.push_str(&i.to_string()),
            }
        }
        out
    }

    /// Record a warning prefixed with the current path.
    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.warnings
            .push(format!("{}: {}", self.path_string(), message.as_ref()));
    }

    /// Record a non-fatal error prefixed with the current path.
    pub fn error(&mut self, message: impl AsRef<str>) {
        self.errors
            .push(format!("{}: {}", self.path_string(), message.as_ref()));
    }
}

/// An integer-backed enumeration that can also be named by string.
///
/// Raw integers are preserved verbatim even when they match no known
/// enumerator; unknown names fall back to the caller's default with a
/// warning.
pub trait NamedEnum: Copy {
    const TYPE_NAME: &'static str;
    fn from_name(name: &str) -> Option<Self>;
    fn from_raw(raw: i32) -> Self;
}

/// A typed entity that can be populated from a JSON object.
pub trait GltfObject: Default {
    const TYPE_NAME: &'static str;
    const KIND: EntityKind;

    /// The shared extras / extensions / unknown-property storage.
    fn common_mut(&mut self) -> &mut EntityCommon;

    /// Dispatch one known property. Returns `false` when the key is not
    /// part of this entity's schema.
    fn read_property(
        &mut self,
        key: &str,
        src: &mut EventSource<'_>,
        cx: &mut ReadContext<'_>,
    ) -> Result<bool>;
}

/// Read the top-level document object. The root must be a JSON object and
/// the input must contain nothing after it.
pub fn read_document<T: GltfObject>(src: &mut EventSource<'_>, cx: &mut ReadContext<'_>) -> Result<T> {
    match src.next()? {
        Some(Event::ObjectStart) => {
            let value = read_object_body(src, cx)?;
            // Drives the lexer to its end state; trailing garbage errors here.
            src.next()?;
            Ok(value)
        }
        Some(_) => Err(Error::malformed(
            src.offset(),
            "document root is not a JSON object",
        )),
        None => Err(Error::malformed(src.offset(), "empty document")),
    }
}

/// Read one object value into `T`, consuming exactly one JSON value.
pub fn read_object<T: GltfObject>(src: &mut EventSource<'_>, cx: &mut ReadContext<'_>) -> Result<T> {
    let ev = src.next()?.ok_or_else(|| src.err_eof())?;
    read_object_from(src, cx, ev)
}

fn read_object_from<T: GltfObject>(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
    first: Event<'_>,
) -> Result<T> {
    match first {
        Event::ObjectStart => read_object_body(src, cx),
        ev => {
            cx.warn(format!(
                "expected an object for {}, got {}",
                T::TYPE_NAME,
                ev.kind_name()
            ));
            finish_value(src, ev)?;
            Ok(T::default())
        }
    }
}

/// Member loop of an object whose `ObjectStart` is already consumed.
fn read_object_body<T: GltfObject>(src: &mut EventSource<'_>, cx: &mut ReadContext<'_>) -> Result<T> {
    let mut out = T::default();
    loop {
        match src.next()? {
            Some(Event::Key(k)) => {
                let key = k.into_owned();
                cx.push_key(&key);
                if key == "extras" {
                    read_extras(&mut out, src, cx)?;
                } else if key == "extensions" {
                    read_extensions(&mut out, src, cx)?;
                } else if out.read_property(&key, src, cx)? {
                    // handled by the entity schema
                } else if cx.capture_unknown {
                    let value = read_value(src)?;
                    out.common_mut().unknown_properties.insert(key.clone(), value);
                } else {
                    skip_value(src)?;
                }
                cx.pop();
            }
            Some(Event::ObjectEnd) => return Ok(out),
            Some(ev) => {
                return Err(Error::malformed(
                    src.offset(),
                    format!("unexpected {} in object", ev.kind_name()),
                ))
            }
            None => return Err(src.err_eof()),
        }
    }
}

fn read_extras<T: GltfObject>(
    out: &mut T,
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<()> {
    match read_value(src)? {
        JsonValue::Object(map) => out.common_mut().extras = map,
        other => cx.warn(format!(
            "expected an object for extras, got {}",
            kind_of(&other)
        )),
    }
    Ok(())
}

/// Parse the `extensions` member of an entity, dispatching each named
/// extension through the registry for this entity kind.
fn read_extensions<T: GltfObject>(
    out: &mut T,
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<()> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::ObjectStart => loop {
            match src.next()? {
                Some(Event::Key(k)) => {
                    let name = k.into_owned();
                    cx.push_key(&name);
                    match cx.registry.resolve(&name, T::KIND) {
                        Resolution::Skip => skip_value(src)?,
                        Resolution::Generic => {
                            let value = read_value(src)?;
                            out.common_mut()
                                .extensions
                                .insert(name.clone(), ExtensionValue::Generic(value));
                        }
                        Resolution::Typed(parse) => {
                            let ext = parse(src, cx)?;
                            out.common_mut()
                                .extensions
                                .insert(name.clone(), ExtensionValue::Typed(ext));
                        }
                    }
                    cx.pop();
                }
                Some(Event::ObjectEnd) => return Ok(()),
                Some(ev) => {
                    return Err(Error::malformed(
                        src.offset(),
                        format!("unexpected {} in extensions", ev.kind_name()),
                    ))
                }
                None => return Err(src.err_eof()),
            }
        },
        ev => {
            cx.warn(format!(
                "expected an object for extensions, got {}",
                ev.kind_name()
            ));
            finish_value(src, ev)
        }
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Int(_) | JsonValue::Uint(_) | JsonValue::Double(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Scalar readers
// ---------------------------------------------------------------------------

/// Read an integer field. Doubles are accepted when they carry no
/// fractional component; anything else warns and yields `default`.
pub fn read_i64(src: &mut EventSource<'_>, cx: &mut ReadContext<'_>, default: i64) -> Result<i64> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::Number(n) => match n.as_i64() {
            Some(v) => Ok(v),
            None => {
                cx.warn(format!("expected an integer, got {}", n.float));
                Ok(default)
            }
        },
        ev => {
            cx.warn(format!("expected an integer, got {}", ev.kind_name()));
            finish_value(src, ev)?;
            Ok(default)
        }
    }
}

/// Read a 32-bit integer field (index fields use −1 as the absent value).
pub fn read_i32(src: &mut EventSource<'_>, cx: &mut ReadContext<'_>, default: i32) -> Result<i32> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::Number(n) => match n.as_i64().and_then(|v| i32::try_from(v).ok()) {
            Some(v) => Ok(v),
            None => {
                cx.warn(format!("expected a 32-bit integer, got {}", n.float));
                Ok(default)
            }
        },
        ev => {
            cx.warn(format!("expected an integer, got {}", ev.kind_name()));
            finish_value(src, ev)?;
            Ok(default)
        }
    }
}

/// Read an index reference; −1 stands for "absent".
pub fn read_index(src: &mut EventSource<'_>, cx: &mut ReadContext<'_>) -> Result<i32> {
    read_i32(src, cx, -1)
}

pub fn read_f64(src: &mut EventSource<'_>, cx: &mut ReadContext<'_>, default: f64) -> Result<f64> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::Number(n) => Ok(n.float),
        ev => {
            cx.warn(format!("expected a number, got {}", ev.kind_name()));
            finish_value(src, ev)?;
            Ok(default)
        }
    }
}

pub fn read_bool(src: &mut EventSource<'_>, cx: &mut ReadContext<'_>, default: bool) -> Result<bool> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::Bool(b) => Ok(b),
        ev => {
            cx.warn(format!("expected a boolean, got {}", ev.kind_name()));
            finish_value(src, ev)?;
            Ok(default)
        }
    }
}

pub fn read_string(src: &mut EventSource<'_>, cx: &mut ReadContext<'_>) -> Result<Option<String>> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::String(s) => Ok(Some(s.into_owned())),
        ev => {
            cx.warn(format!("expected a string, got {}", ev.kind_name()));
            finish_value(src, ev)?;
            Ok(None)
        }
    }
}

/// Read an enum field from either its integer value or its name string.
pub fn read_enum<E: NamedEnum>(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
    default: E,
) -> Result<E> {
    Ok(read_enum_opt(src, cx)?.unwrap_or(default))
}

/// Like [`read_enum`], for optional fields that stay `None` on mismatch.
pub fn read_enum_opt<E: NamedEnum>(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<Option<E>> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::Number(n) => match n.as_i64().and_then(|v| i32::try_from(v).ok()) {
            Some(v) => Ok(Some(E::from_raw(v))),
            None => {
                cx.warn(format!(
                    "{} is not a valid {} enumerator",
                    n.float,
                    E::TYPE_NAME
                ));
                Ok(None)
            }
        },
        Event::String(s) => match E::from_name(&s) {
            Some(e) => Ok(Some(e)),
            None => {
                cx.warn(format!("unknown {} name '{}'", E::TYPE_NAME, s));
                Ok(None)
            }
        },
        ev => {
            cx.warn(format!(
                "expected a {} value, got {}",
                E::TYPE_NAME,
                ev.kind_name()
            ));
            finish_value(src, ev)?;
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// Array readers
// ---------------------------------------------------------------------------

/// Read an array of numbers as doubles. Non-numeric elements warn and are
/// replaced by 0.0 so the output length matches the source array.
pub fn read_f64_array(src: &mut EventSource<'_>, cx: &mut ReadContext<'_>) -> Result<Vec<f64>> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::ArrayStart => {
            let mut out = Vec::new();
            loop {
                match src.next()?.ok_or_else(|| src.err_eof())? {
                    Event::ArrayEnd => return Ok(out),
                    Event::Number(n) => out.push(n.float),
                    ev => {
                        cx.warn(format!("expected a number, got {}", ev.kind_name()));
                        finish_value(src, ev)?;
                        out.push(0.0);
                    }
                }
            }
        }
        ev => {
            cx.warn(format!("expected an array, got {}", ev.kind_name()));
            finish_value(src, ev)?;
            Ok(Vec::new())
        }
    }
}

/// Read a fixed-size double array; a length mismatch warns and yields `None`.
pub fn read_f64_fixed<const N: usize>(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<Option<[f64; N]>> {
    let values = read_f64_array(src, cx)?;
    match <[f64; N]>::try_from(values) {
        Ok(arr) => Ok(Some(arr)),
        Err(values) => {
            cx.warn(format!(
                "expected an array of {} numbers, got {} elements",
                N,
                values.len()
            ));
            Ok(None)
        }
    }
}

/// Read an array of integers, with `element_default` for bad elements.
pub fn read_i32_array(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
    element_default: i32,
) -> Result<Vec<i32>> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::ArrayStart => {
            let mut out = Vec::new();
            loop {
                match src.next()?.ok_or_else(|| src.err_eof())? {
                    Event::ArrayEnd => return Ok(out),
                    Event::Number(n) => match n.as_i64().and_then(|v| i32::try_from(v).ok()) {
                        Some(v) => out.push(v),
                        None => {
                            cx.warn(format!("expected an integer, got {}", n.float));
                            out.push(element_default);
                        }
                    },
                    ev => {
                        cx.warn(format!("expected an integer, got {}", ev.kind_name()));
                        finish_value(src, ev)?;
                        out.push(element_default);
                    }
                }
            }
        }
        ev => {
            cx.warn(format!("expected an array, got {}", ev.kind_name()));
            finish_value(src, ev)?;
            Ok(Vec::new())
        }
    }
}

/// Read an array of strings; non-string elements warn and are dropped.
pub fn read_string_array(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<Vec<String>> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::ArrayStart => {
            let mut out = Vec::new();
            loop {
                match src.next()?.ok_or_else(|| src.err_eof())? {
                    Event::ArrayEnd => return Ok(out),
                    Event::String(s) => out.push(s.into_owned()),
                    ev => {
                        cx.warn(format!("expected a string, got {}", ev.kind_name()));
                        finish_value(src, ev)?;
                    }
                }
            }
        }
        ev => {
            cx.warn(format!("expected an array, got {}", ev.kind_name()));
            finish_value(src, ev)?;
            Ok(Vec::new())
        }
    }
}

/// Read a string-to-index mapping such as a primitive's `attributes`.
pub fn read_index_map(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<IndexMap<String, i32>> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::ObjectStart => {
            let mut out = IndexMap::new();
            loop {
                match src.next()? {
                    Some(Event::Key(k)) => {
                        let key = k.into_owned();
                        cx.push_key(&key);
                        let index = read_index(src, cx)?;
                        cx.pop();
                        out.insert(key, index);
                    }
                    Some(Event::ObjectEnd) => return Ok(out),
                    Some(ev) => {
                        return Err(Error::malformed(
                            src.offset(),
                            format!("unexpected {} in object", ev.kind_name()),
                        ))
                    }
                    None => return Err(src.err_eof()),
                }
            }
        }
        ev => {
            cx.warn(format!("expected an object, got {}", ev.kind_name()));
            finish_value(src, ev)?;
            Ok(IndexMap::new())
        }
    }
}

/// Read an array of typed objects. Every source element yields exactly one
/// output entry; non-object elements warn and become defaults.
pub fn read_object_array<T: GltfObject>(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<Vec<T>> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::ArrayStart => {
            let mut out = Vec::new();
            loop {
                match src.next()?.ok_or_else(|| src.err_eof())? {
                    Event::ArrayEnd => return Ok(out),
                    ev => {
                        cx.push_index(out.len());
                        let value = read_object_from::<T>(src, cx, ev)?;
                        cx.pop();
                        out.push(value);
                    }
                }
            }
        }
        ev => {
            cx.warn(format!("expected an array, got {}", ev.kind_name()));
            finish_value(src, ev)?;
            Ok(Vec::new())
        }
    }
}

/// Read an array of index maps (morph targets).
pub fn read_index_map_array(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<Vec<IndexMap<String, i32>>> {
    match src.next()?.ok_or_else(|| src.err_eof())? {
        Event::ArrayStart => {
            let mut out = Vec::new();
            loop {
                match src.next()?.ok_or_else(|| src.err_eof())? {
                    Event::ArrayEnd => return Ok(out),
                    Event::ObjectStart => {
                        cx.push_index(out.len());
                        let mut map = IndexMap::new();
                        loop {
                            match src.next()? {
                                Some(Event::Key(k)) => {
                                    let key = k.into_owned();
                                    cx.push_key(&key);
                                    let index = read_index(src, cx)?;
                                    cx.pop();
                                    map.insert(key, index);
                                }
                                Some(Event::ObjectEnd) => break,
                                Some(ev) => {
                                    return Err(Error::malformed(
                                        src.offset(),
                                        format!("unexpected {} in object", ev.kind_name()),
                                    ))
                                }
                                None => return Err(src.err_eof()),
                            }
                        }
                        cx.pop();
                        out.push(map);
                    }
                    ev => {
                        cx.warn(format!("expected an object, got {}", ev.kind_name()));
                        finish_value(src, ev)?;
                        out.push(IndexMap::new());
                    }
                }
            }
        }
        ev => {
            cx.warn(format!("expected an array, got {}", ev.kind_name()));
            finish_value(src, ev)?;
            Ok(Vec::new())
        }
    }
}

// ---------------------------------------------------------------------------
// Generic values
// ---------------------------------------------------------------------------

/// Read one complete JSON value into the dynamic value tree.
pub fn read_value(src: &mut EventSource<'_>) -> Result<JsonValue> {
    let ev = src.next()?.ok_or_else(|| src.err_eof())?;
    read_value_from(src, ev)
}

fn read_value_from(src: &mut EventSource<'_>, first: Event<'_>) -> Result<JsonValue> {
    match first {
        Event::Null => Ok(JsonValue::Null),
        Event::Bool(b) => Ok(JsonValue::Bool(b)),
        Event::Number(n) => Ok(n.into()),
        Event::String(s) => Ok(JsonValue::String(s.into_owned())),
        Event::ObjectStart => {
            let mut map = JsonObject::new();
            loop {
                match src.next()? {
                    Some(Event::Key(k)) => {
                        let key = k.into_owned();
                        let value = read_value(src)?;
                        map.insert(key, value);
                    }
                    Some(Event::ObjectEnd) => return Ok(JsonValue::Object(map)),
                    Some(ev) => {
                        return Err(Error::malformed(
                            src.offset(),
                            format!("unexpected {} in object", ev.kind_name()),
                        ))
                    }
                    None => return Err(src.err_eof()),
                }
            }
        }
        Event::ArrayStart => {
            let mut values = Vec::new();
            loop {
                match src.next()?.ok_or_else(|| src.err_eof())? {
                    Event::ArrayEnd => return Ok(JsonValue::Array(values)),
                    ev => values.push(read_value_from(src, ev)?),
                }
            }
        }
        ev => Err(Error::malformed(
            src.offset(),
            format!("unexpected {}", ev.kind_name()),
        )),
    }
}

/// Consume and discard one complete JSON value.
pub fn skip_value(src: &mut EventSource<'_>) -> Result<()> {
    let ev = src.next()?.ok_or_else(|| src.err_eof())?;
    finish_value(src, ev)
}

/// Consume the remainder of a value whose first event is already read.
pub fn finish_value(src: &mut EventSource<'_>, first: Event<'_>) -> Result<()> {
    let mut depth = match first {
        Event::ObjectStart | Event::ArrayStart => 1usize,
        _ => return Ok(()),
    };
    while depth > 0 {
        match src.next()?.ok_or_else(|| src.err_eof())? {
            Event::ObjectStart | Event::ArrayStart => depth += 1,
            Event::ObjectEnd | Event::ArrayEnd => depth -= 1,
            _ => {}
        }
    }
    Ok(())
}
