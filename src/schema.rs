//! The settings-structure descriptor: how an application describes its
//! configurable fields to the resolution engine.
//!
//! Instead of inspecting arbitrary structs at runtime, each settings struct
//! implements [`Section`], enumerating its fields as [`FieldNode`]s — a leaf
//! (typed mutable handle plus metadata) or a nested section. The closed set
//! of supported leaf types lives in [`FieldValue`]; each resolution pass
//! dispatches on that tag directly, with no re-inspection.

use crate::duration::Duration;

/// The source a derived key belongs to. Renames and skip markers are
/// per-source: a field can be hidden from the environment while still
/// flaggable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Command-line flags; path segments joined with `-`.
    Flag,
    /// Environment variables; prefix + segments joined with `_`, upper-cased.
    Env,
    /// Config file documents; segments are nested document keys.
    File,
}

impl SourceKind {
    pub(crate) const COUNT: usize = 3;

    pub(crate) const fn index(self) -> usize {
        match self {
            SourceKind::Flag => 0,
            SourceKind::Env => 1,
            SourceKind::File => 2,
        }
    }
}

/// Per-field metadata: declared name, help text, and per-source
/// renames/skip markers.
#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    name: &'static str,
    help: &'static str,
    renames: [Option<&'static str>; SourceKind::COUNT],
    skips: [bool; SourceKind::COUNT],
}

impl FieldMeta {
    pub const fn new(name: &'static str) -> Self {
        FieldMeta {
            name,
            help: "",
            renames: [None; SourceKind::COUNT],
            skips: [false; SourceKind::COUNT],
        }
    }

    /// Help text, surfaced as the flag description.
    pub const fn help(mut self, text: &'static str) -> Self {
        self.help = text;
        self
    }

    /// Use `key` instead of the declared name for one source.
    pub const fn rename(mut self, source: SourceKind, key: &'static str) -> Self {
        self.renames[source.index()] = Some(key);
        self
    }

    /// Use `key` instead of the declared name for every source.
    pub const fn rename_all(mut self, key: &'static str) -> Self {
        self.renames = [Some(key); SourceKind::COUNT];
        self
    }

    /// Hide this field (and, for sections, its whole subtree) from one source.
    pub const fn skip(mut self, source: SourceKind) -> Self {
        self.skips[source.index()] = true;
        self
    }

    /// Hide this field from every source. It remains settable only by the
    /// caller's own defaults.
    pub const fn skip_all(mut self) -> Self {
        self.skips = [true; SourceKind::COUNT];
        self
    }

    pub(crate) fn help_text(&self) -> &'static str {
        self.help
    }

    pub(crate) fn skipped(&self, source: SourceKind) -> bool {
        self.skips[source.index()]
    }

    /// The path segment for `source`: the rename if present, else the
    /// declared name, lower-cased either way.
    pub(crate) fn segment(&self, source: SourceKind) -> String {
        self.renames[source.index()]
            .unwrap_or(self.name)
            .to_ascii_lowercase()
    }
}

/// A typed mutable handle to one leaf field. The variant set is the closed
/// list of supported config field types.
#[derive(Debug)]
pub enum FieldValue<'a> {
    Str(&'a mut String),
    Bool(&'a mut bool),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    F64(&'a mut f64),
    Duration(&'a mut Duration),
}

impl FieldValue<'_> {
    /// The kind name used in user-facing parse errors.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Str(_) => "string",
            FieldValue::Bool(_) => "bool",
            FieldValue::I64(_) => "i64",
            FieldValue::Isize(_) => "isize",
            FieldValue::U64(_) => "u64",
            FieldValue::Usize(_) => "usize",
            FieldValue::F64(_) => "f64",
            FieldValue::Duration(_) => "Duration",
        }
    }

    /// Render the current content as text. Used to seed flag defaults at
    /// registration time.
    pub(crate) fn render(&self) -> String {
        match self {
            FieldValue::Str(v) => (**v).clone(),
            FieldValue::Bool(v) => v.to_string(),
            FieldValue::I64(v) => v.to_string(),
            FieldValue::Isize(v) => v.to_string(),
            FieldValue::U64(v) => v.to_string(),
            FieldValue::Usize(v) => v.to_string(),
            FieldValue::F64(v) => v.to_string(),
            FieldValue::Duration(v) => v.to_string(),
        }
    }
}

macro_rules! field_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a mut $ty> for FieldValue<'a> {
                fn from(v: &'a mut $ty) -> Self {
                    FieldValue::$variant(v)
                }
            }
        )*
    };
}

field_value_from! {
    String => Str,
    bool => Bool,
    i64 => I64,
    isize => Isize,
    u64 => U64,
    usize => Usize,
    f64 => F64,
    Duration => Duration,
}

/// One field of a section: a leaf value or a nested sub-section.
pub enum FieldNode<'a> {
    Leaf(FieldMeta, FieldValue<'a>),
    Section(FieldMeta, &'a mut dyn Section),
    /// A nullable sub-section. `None` is treated as "not present" and the
    /// subtree is skipped entirely.
    OptionalSection(FieldMeta, Option<&'a mut dyn Section>),
}

impl<'a> FieldNode<'a> {
    pub fn leaf(name: &'static str, value: impl Into<FieldValue<'a>>) -> Self {
        FieldNode::Leaf(FieldMeta::new(name), value.into())
    }

    pub fn leaf_with(meta: FieldMeta, value: impl Into<FieldValue<'a>>) -> Self {
        FieldNode::Leaf(meta, value.into())
    }

    pub fn section<S: Section>(name: &'static str, section: &'a mut S) -> Self {
        FieldNode::Section(FieldMeta::new(name), section)
    }

    pub fn section_with<S: Section>(meta: FieldMeta, section: &'a mut S) -> Self {
        FieldNode::Section(meta, section)
    }

    pub fn optional_section<S: Section>(
        name: &'static str,
        section: Option<&'a mut S>,
    ) -> Self {
        FieldNode::OptionalSection(
            FieldMeta::new(name),
            section.map(|s| s as &mut dyn Section),
        )
    }

    pub fn optional_section_with<S: Section>(
        meta: FieldMeta,
        section: Option<&'a mut S>,
    ) -> Self {
        FieldNode::OptionalSection(meta, section.map(|s| s as &mut dyn Section))
    }
}

/// An aggregate of configurable fields.
///
/// Implementations list every field in declaration order. The engine never
/// stores the returned nodes beyond one traversal; it mutates leaves in
/// place through the handles.
pub trait Section {
    fn fields(&mut self) -> Vec<FieldNode<'_>>;
}
