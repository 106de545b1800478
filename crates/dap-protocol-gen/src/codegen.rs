//! Compilation of schema definitions into C++ record declarations.
//!
//! The pipeline is [`CodeGenerator::build_records`] (schema → record
//! descriptors), then [`CodeGenerator::emit`] (descriptors → artifacts in
//! dependency order). [`CodeGenerator::generate_all`] and
//! [`CodeGenerator::write_to_disk`] drive both.

use crate::schema::Schema;
use smol_str::SmolStr;

mod emit;
mod output;
mod records;
mod render;
mod types;
mod utils;

pub use emit::OutputSinks;
pub use output::{GeneratedArtifacts, OutputPaths};
pub use types::ResolvedType;

/// Definition names that are never compiled into records.
///
/// The envelope and its three role specializations are declared by the
/// declarations prologue instead.
pub const RESERVED_NAMES: [&str; 4] = ["ProtocolMessage", "Request", "Response", "Event"];

/// Role a record inherits from through the `allOf` convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseCategory {
    Request,
    Response,
    Event,
}

impl BaseCategory {
    /// Map a definition name to its role, if it is one of the three role names
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Request" => Some(Self::Request),
            "Response" => Some(Self::Response),
            "Event" => Some(Self::Event),
            _ => None,
        }
    }

    /// The C++ base type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "Request",
            Self::Response => "Response",
            Self::Event => "Event",
        }
    }

    /// Property holding the record's own fields
    pub(crate) fn field_source(&self) -> &'static str {
        match self {
            Self::Request => "arguments",
            Self::Response | Self::Event => "body",
        }
    }

    /// Property whose closed enumeration carries the wire-protocol tag
    pub(crate) fn tag_source(&self) -> Option<&'static str> {
        match self {
            Self::Request => Some("command"),
            Self::Response => None,
            Self::Event => Some("event"),
        }
    }
}

/// Which definitions artifact a record's definition is written into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EmitCategory {
    Request,
    Response,
    Event,
    Types,
}

impl EmitCategory {
    pub const ALL: [EmitCategory; 4] = [Self::Request, Self::Response, Self::Event, Self::Types];

    /// Message records are emitted as roots; shared types only when referenced.
    pub fn is_message(&self) -> bool {
        !matches!(self, Self::Types)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Event => "event",
            Self::Types => "types",
        }
    }
}

impl From<Option<BaseCategory>> for EmitCategory {
    fn from(base: Option<BaseCategory>) -> Self {
        match base {
            Some(BaseCategory::Request) => Self::Request,
            Some(BaseCategory::Response) => Self::Response,
            Some(BaseCategory::Event) => Self::Event,
            None => Self::Types,
        }
    }
}

/// One compiled field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name as it appears on the wire
    pub name: SmolStr,
    /// Canonical type name, e.g. `integer`, `array<Source>`, `variant<string, null>`
    pub ty: String,
    pub optional: bool,
    /// Property description with enumeration notes appended
    pub description: String,
    /// Quoted first value of a closed enumeration
    pub default_value: Option<String>,
}

/// `using <from> = <to>;` inside a record declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAlias {
    pub from: String,
    pub to: String,
}

/// Compiled, emission-ready form of one definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub name: SmolStr,
    pub description: String,
    /// Wire-protocol tag: the request's `command` or the event's `event` value
    pub tag: String,
    pub base: Option<BaseCategory>,
    pub aliases: Vec<TypeAlias>,
    pub fields: Vec<FieldDescriptor>,
    /// Records that must be emitted first, in first-seen order without duplicates
    pub deps: Vec<SmolStr>,
    pub category: EmitCategory,
}

impl RecordDescriptor {
    pub(crate) fn new(name: SmolStr, base: Option<BaseCategory>) -> Self {
        Self {
            name,
            description: String::new(),
            tag: String::new(),
            base,
            aliases: Vec::new(),
            fields: Vec::new(),
            deps: Vec::new(),
            category: EmitCategory::from(base),
        }
    }

    pub(crate) fn add_dependency(&mut self, dep: SmolStr) {
        if !self.deps.contains(&dep) {
            self.deps.push(dep);
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Names and paths baked into the fixed boilerplate of every artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// C++ namespace the records live in
    pub namespace: String,
    /// Include path of the declarations artifact, used by definitions artifacts
    pub header_include: String,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            namespace: "dap".to_string(),
            header_include: "dap/protocol.h".to_string(),
        }
    }
}

/// Code generator for protocol records
pub struct CodeGenerator<'s> {
    schema: &'s Schema,
    layout: ArtifactLayout,
}

impl<'s> CodeGenerator<'s> {
    /// Create a new code generator
    pub fn new(schema: &'s Schema, layout: ArtifactLayout) -> Self {
        Self { schema, layout }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }
}
