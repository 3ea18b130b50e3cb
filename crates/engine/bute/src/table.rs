//! Attribute table with overlay provenance and typed accessors
//!
//! [`ButeFile`] is the public surface of the crate: it owns every
//! parsed group, the interned string pool and the source checksum,
//! and resolves `(tag, attribute)` queries case-insensitively.
//!
//! Entries remember where they came from (parsed from the source,
//! added to a source group at runtime, or part of a group created
//! entirely at runtime). An entry's home never moves once assigned;
//! later writes update it in place. `save` serializes the union of
//! all three provenances back into parseable text.

use crate::crypto::BlockCodec;
use crate::intern::StringPool;
use crate::parser::Parser;
use crate::value::{Point, Range, Rect, Value, ValueKind};
use crate::{Error, Result};
use glam::Vec3;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

/// Where an entry was homed when it was first created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Parsed out of the source text
    Base,
    /// Written at runtime into a group that exists in the source
    AddedAttribute,
    /// Written at runtime into a group the source never had
    NewGroup,
}

#[derive(Debug)]
struct Attr {
    /// Casing of the first insertion, used for output
    name: String,
    value: Value,
    provenance: Provenance,
}

#[derive(Debug)]
struct Group {
    /// Casing of the first insertion, used for output
    name: String,
    /// True when the group appeared in the parsed source
    from_source: bool,
    /// Lowercased attribute name -> entry
    attrs: HashMap<String, Attr>,
    /// Lowercased attribute names in insertion order
    order: Vec<String>,
}

impl Group {
    fn new(name: &str, from_source: bool) -> Self {
        Self {
            name: name.to_string(),
            from_source,
            attrs: HashMap::new(),
            order: Vec::new(),
        }
    }
}

/// An in-memory attribute file: groups of typed key/value pairs
#[derive(Debug, Default)]
pub struct ButeFile {
    /// Lowercased tag name -> group
    groups: HashMap<String, Group>,
    /// Lowercased tag names in insertion order
    order: Vec<String>,
    pool: StringPool,
    checksum: u32,
}

impl ButeFile {
    /// Create an empty table with no groups
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a source string into a fresh table
    pub fn from_str(src: &str) -> Result<Self> {
        let mut file = ButeFile::new();
        let parser = Parser::new(src)?;
        file.checksum = parser.parse_into(&mut file)?;
        Ok(file)
    }

    /// Parse everything a reader yields
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_str(std::str::from_utf8(&bytes)?)
    }

    /// Load a plain-text attribute file from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading attribute file");
        let src = std::fs::read_to_string(path)?;
        Self::from_str(&src)
    }

    /// Decrypt a reader's bytes with `key`, then parse them
    pub fn from_encrypted_reader(mut reader: impl Read, key: &[u8]) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let plain = BlockCodec::new(key)?.decrypt(&bytes)?;
        Self::from_str(std::str::from_utf8(&plain)?)
    }

    /// Load an encrypted attribute file from disk
    pub fn from_encrypted_file<P: AsRef<Path>>(path: P, key: &[u8]) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading encrypted attribute file");
        let bytes = std::fs::read(path)?;
        Self::from_encrypted_reader(bytes.as_slice(), key)
    }

    /// Checksum of the bytes the last parse consumed (0 for an empty table)
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    // ------------------------------------------------------------------
    // Parser hooks
    // ------------------------------------------------------------------

    pub(crate) fn intern(&mut self, s: &str) -> Arc<str> {
        self.pool.intern(s)
    }

    /// Ensure a base group exists for a parsed group header.
    pub(crate) fn touch_base_group(&mut self, tag: &str) {
        let key = tag.to_ascii_lowercase();
        if !self.groups.contains_key(&key) {
            self.groups.insert(key.clone(), Group::new(tag, true));
            self.order.push(key);
        }
    }

    /// Insert a parsed attribute. Last write wins on duplicates; the
    /// first-seen casing of the name is kept.
    pub(crate) fn insert_base(&mut self, tag: &str, attr: &str, value: Value) {
        self.touch_base_group(tag);
        let group = self
            .groups
            .get_mut(&tag.to_ascii_lowercase())
            .expect("group created above");
        let key = attr.to_ascii_lowercase();
        if let Some(entry) = group.attrs.get_mut(&key) {
            entry.value = value;
        } else {
            group.attrs.insert(
                key.clone(),
                Attr {
                    name: attr.to_string(),
                    value,
                    provenance: Provenance::Base,
                },
            );
            group.order.push(key);
        }
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    fn find(&self, tag: &str, attr: &str) -> Option<&Value> {
        self.groups
            .get(&tag.to_ascii_lowercase())?
            .attrs
            .get(&attr.to_ascii_lowercase())
            .map(|a| &a.value)
    }

    fn lookup(&self, tag: &str, attr: &str) -> Result<&Value> {
        let group = self
            .groups
            .get(&tag.to_ascii_lowercase())
            .ok_or_else(|| Error::TagNotFound(tag.to_string()))?;
        group
            .attrs
            .get(&attr.to_ascii_lowercase())
            .map(|a| &a.value)
            .ok_or_else(|| Error::AttrNotFound {
                tag: tag.to_string(),
                attr: attr.to_string(),
            })
    }

    /// Resolve or create the entry for `(tag, attr)`.
    ///
    /// Homing rules: an existing entry is updated where it lives; a
    /// new attribute in a source group is homed as `AddedAttribute`;
    /// anything in a runtime-created group is homed as `NewGroup`.
    fn get_or_create(&mut self, tag: &str, attr: &str) -> &mut Value {
        let tag_key = tag.to_ascii_lowercase();
        if !self.groups.contains_key(&tag_key) {
            self.groups.insert(tag_key.clone(), Group::new(tag, false));
            self.order.push(tag_key.clone());
        }
        let group = self.groups.get_mut(&tag_key).expect("group created above");

        let attr_key = attr.to_ascii_lowercase();
        if !group.attrs.contains_key(&attr_key) {
            let provenance = if group.from_source {
                Provenance::AddedAttribute
            } else {
                Provenance::NewGroup
            };
            group.attrs.insert(
                attr_key.clone(),
                Attr {
                    name: attr.to_string(),
                    value: Value::Null,
                    provenance,
                },
            );
            group.order.push(attr_key.clone());
        }
        &mut group.attrs.get_mut(&attr_key).expect("attr created above").value
    }

    /// Check whether `(tag, attr)` exists in any table
    pub fn exist(&self, tag: &str, attr: &str) -> bool {
        self.find(tag, attr).is_some()
    }

    /// Check whether a group exists at all
    pub fn tag_exists(&self, tag: &str) -> bool {
        self.groups.contains_key(&tag.to_ascii_lowercase())
    }

    /// Kind of the stored value, or `None` when absent
    pub fn value_type(&self, tag: &str, attr: &str) -> Option<ValueKind> {
        self.find(tag, attr).map(|v| v.kind())
    }

    /// Where the entry was homed, or `None` when absent
    pub fn provenance(&self, tag: &str, attr: &str) -> Option<Provenance> {
        self.groups
            .get(&tag.to_ascii_lowercase())?
            .attrs
            .get(&attr.to_ascii_lowercase())
            .map(|a| a.provenance)
    }

    /// Group names in insertion order, original casing
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(move |k| self.groups[k].name.as_str())
    }

    /// Attribute names and values of one group, in insertion order
    pub fn attrs(&self, tag: &str) -> Result<impl Iterator<Item = (&str, &Value)>> {
        let group = self
            .groups
            .get(&tag.to_ascii_lowercase())
            .ok_or_else(|| Error::TagNotFound(tag.to_string()))?;
        Ok(group
            .order
            .iter()
            .map(move |k| (group.attrs[k].name.as_str(), &group.attrs[k].value)))
    }

    // ------------------------------------------------------------------
    // Typed getters
    // ------------------------------------------------------------------

    pub fn get_int(&self, tag: &str, attr: &str) -> Result<i32> {
        self.lookup(tag, attr)?.as_int()
    }

    pub fn get_dword(&self, tag: &str, attr: &str) -> Result<u32> {
        self.lookup(tag, attr)?.as_dword()
    }

    pub fn get_byte(&self, tag: &str, attr: &str) -> Result<u8> {
        self.lookup(tag, attr)?.as_byte()
    }

    pub fn get_bool(&self, tag: &str, attr: &str) -> Result<bool> {
        self.lookup(tag, attr)?.as_bool()
    }

    pub fn get_float(&self, tag: &str, attr: &str) -> Result<f32> {
        self.lookup(tag, attr)?.as_float()
    }

    pub fn get_double(&self, tag: &str, attr: &str) -> Result<f64> {
        self.lookup(tag, attr)?.as_double()
    }

    pub fn get_string(&self, tag: &str, attr: &str) -> Result<&str> {
        self.lookup(tag, attr)?.as_str()
    }

    pub fn get_rect(&self, tag: &str, attr: &str) -> Result<Rect> {
        self.lookup(tag, attr)?.as_rect()
    }

    pub fn get_point(&self, tag: &str, attr: &str) -> Result<Point> {
        self.lookup(tag, attr)?.as_point()
    }

    pub fn get_vector(&self, tag: &str, attr: &str) -> Result<Vec3> {
        self.lookup(tag, attr)?.as_vector()
    }

    pub fn get_range(&self, tag: &str, attr: &str) -> Result<Range> {
        self.lookup(tag, attr)?.as_range()
    }

    // ------------------------------------------------------------------
    // Defaulting getters: never fail, never mutate
    // ------------------------------------------------------------------

    pub fn get_int_or(&self, tag: &str, attr: &str, default: i32) -> i32 {
        self.get_int(tag, attr).unwrap_or(default)
    }

    pub fn get_dword_or(&self, tag: &str, attr: &str, default: u32) -> u32 {
        self.get_dword(tag, attr).unwrap_or(default)
    }

    pub fn get_byte_or(&self, tag: &str, attr: &str, default: u8) -> u8 {
        self.get_byte(tag, attr).unwrap_or(default)
    }

    pub fn get_bool_or(&self, tag: &str, attr: &str, default: bool) -> bool {
        self.get_bool(tag, attr).unwrap_or(default)
    }

    pub fn get_float_or(&self, tag: &str, attr: &str, default: f32) -> f32 {
        self.get_float(tag, attr).unwrap_or(default)
    }

    pub fn get_double_or(&self, tag: &str, attr: &str, default: f64) -> f64 {
        self.get_double(tag, attr).unwrap_or(default)
    }

    pub fn get_string_or<'a>(&'a self, tag: &str, attr: &str, default: &'a str) -> &'a str {
        self.get_string(tag, attr).unwrap_or(default)
    }

    pub fn get_rect_or(&self, tag: &str, attr: &str, default: Rect) -> Rect {
        self.get_rect(tag, attr).unwrap_or(default)
    }

    pub fn get_point_or(&self, tag: &str, attr: &str, default: Point) -> Point {
        self.get_point(tag, attr).unwrap_or(default)
    }

    pub fn get_vector_or(&self, tag: &str, attr: &str, default: Vec3) -> Vec3 {
        self.get_vector(tag, attr).unwrap_or(default)
    }

    pub fn get_range_or(&self, tag: &str, attr: &str, default: Range) -> Range {
        self.get_range(tag, attr).unwrap_or(default)
    }

    // ------------------------------------------------------------------
    // Typed setters: resolve or create, then retype in place
    // ------------------------------------------------------------------

    pub fn set_int(&mut self, tag: &str, attr: &str, v: i32) {
        *self.get_or_create(tag, attr) = Value::Int(v);
    }

    pub fn set_dword(&mut self, tag: &str, attr: &str, v: u32) {
        *self.get_or_create(tag, attr) = Value::Dword(v);
    }

    pub fn set_byte(&mut self, tag: &str, attr: &str, v: u8) {
        *self.get_or_create(tag, attr) = Value::Byte(v);
    }

    pub fn set_bool(&mut self, tag: &str, attr: &str, v: bool) {
        *self.get_or_create(tag, attr) = Value::Bool(v);
    }

    pub fn set_float(&mut self, tag: &str, attr: &str, v: f32) {
        *self.get_or_create(tag, attr) = Value::Float(v);
    }

    pub fn set_double(&mut self, tag: &str, attr: &str, v: f64) {
        *self.get_or_create(tag, attr) = Value::Double(v);
    }

    pub fn set_string(&mut self, tag: &str, attr: &str, v: &str) {
        let s = self.pool.intern(v);
        *self.get_or_create(tag, attr) = Value::String(s);
    }

    pub fn set_rect(&mut self, tag: &str, attr: &str, v: Rect) {
        *self.get_or_create(tag, attr) = Value::Rect(v);
    }

    pub fn set_point(&mut self, tag: &str, attr: &str, v: Point) {
        *self.get_or_create(tag, attr) = Value::Point(v);
    }

    pub fn set_vector(&mut self, tag: &str, attr: &str, v: Vec3) {
        *self.get_or_create(tag, attr) = Value::Vector(v);
    }

    pub fn set_range(&mut self, tag: &str, attr: &str, v: Range) {
        *self.get_or_create(tag, attr) = Value::Range(v);
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Write the union of all groups back out in source syntax.
    /// Entries that were created but never typed are skipped.
    pub fn save(&self, writer: &mut impl Write) -> Result<()> {
        for tag_key in &self.order {
            let group = &self.groups[tag_key];
            writeln!(writer, "[{}]", group.name)?;
            for attr_key in &group.order {
                let attr = &group.attrs[attr_key];
                if attr.value.is_null() {
                    continue;
                }
                writeln!(writer, "{} = {}", attr.name, attr.value)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Serialize to an owned string
    pub fn to_source(&self) -> String {
        let mut out = Vec::new();
        self.save(&mut out).expect("writing to a Vec cannot fail");
        String::from_utf8(out).expect("serializer emits utf-8")
    }

    /// Save plain text to disk
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "saving attribute file");
        let mut file = std::fs::File::create(path)?;
        self.save(&mut file)
    }

    /// Encrypt the serialized text with `key` and write it
    pub fn save_encrypted(&self, writer: &mut impl Write, key: &[u8]) -> Result<()> {
        let cipher_text = BlockCodec::new(key)?.encrypt(self.to_source().as_bytes());
        writer.write_all(&cipher_text)?;
        Ok(())
    }

    /// Save encrypted bytes to disk
    pub fn save_encrypted_file<P: AsRef<Path>>(&self, path: P, key: &[u8]) -> Result<()> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "saving encrypted attribute file");
        let mut file = std::fs::File::create(path)?;
        self.save_encrypted(&mut file, key)
    }
}
