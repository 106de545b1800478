use crate::error::{CodegenError, Result};
use crate::schema::{TypeDescriptor, TypeValue};
use smol_str::SmolStr;

use super::CodeGenerator;

/// Primitive type keywords, mapped one-to-one onto binding typedefs
const PRIMITIVES: [&str; 6] = ["boolean", "string", "integer", "number", "object", "null"];

/// Canonical type name of a descriptor plus the records it references
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedType {
    pub name: String,
    pub deps: Vec<SmolStr>,
}

impl ResolvedType {
    fn primitive(name: &str) -> Self {
        Self {
            name: name.to_string(),
            deps: Vec::new(),
        }
    }
}

/// The shape of a type descriptor, one case per handled form
enum TypeShape<'a> {
    Ref(&'a str),
    Primitive(&'static str),
    Array(Option<&'a TypeDescriptor>),
    Union(&'a [TypeValue]),
}

impl<'a> TypeShape<'a> {
    fn of_descriptor(
        descriptor: &'a TypeDescriptor,
        def_name: &str,
        field_path: &str,
    ) -> Result<Self> {
        if let Some(reference) = &descriptor.reference {
            return Ok(Self::Ref(reference));
        }
        match &descriptor.ty {
            Some(ty) => Self::of_value(ty, descriptor.items.as_deref(), def_name, field_path),
            None => Err(CodegenError::unsupported(
                "No type specified",
                def_name,
                field_path,
            )),
        }
    }

    /// `items` belongs to the enclosing descriptor; an `array` keyword inside
    /// a union uses it too.
    fn of_value(
        value: &'a TypeValue,
        items: Option<&'a TypeDescriptor>,
        def_name: &str,
        field_path: &str,
    ) -> Result<Self> {
        match value {
            TypeValue::Keyword(keyword) if keyword == "array" => Ok(Self::Array(items)),
            TypeValue::Keyword(keyword) => PRIMITIVES
                .into_iter()
                .find(|p| *p == keyword.as_str())
                .map(Self::Primitive)
                .ok_or_else(|| {
                    CodegenError::unsupported(
                        format!("Unhandled property type '{keyword}'"),
                        def_name,
                        field_path,
                    )
                }),
            TypeValue::Union(values) => Ok(Self::Union(values)),
            TypeValue::Other(other) => Err(CodegenError::unsupported(
                format!("Unsupported type '{other}'"),
                def_name,
                field_path,
            )),
        }
    }
}

impl<'c> CodeGenerator<'c> {
    /// Resolve a property's type descriptor to its canonical type name.
    ///
    /// `def_name` and `field_path` only give errors their context.
    pub(super) fn resolve_type(
        &self,
        descriptor: &TypeDescriptor,
        def_name: &str,
        field_path: &str,
    ) -> Result<ResolvedType> {
        let shape = TypeShape::of_descriptor(descriptor, def_name, field_path)?;
        self.resolve_shape(shape, descriptor.items.as_deref(), def_name, field_path)
    }

    fn resolve_shape(
        &self,
        shape: TypeShape<'_>,
        items: Option<&TypeDescriptor>,
        def_name: &str,
        field_path: &str,
    ) -> Result<ResolvedType> {
        match shape {
            TypeShape::Ref(reference) => {
                let (name, _) = self
                    .schema
                    .resolve_ref(reference)
                    .ok_or_else(|| CodegenError::unknown_ref(reference, def_name, field_path))?;
                Ok(ResolvedType {
                    name: name.to_string(),
                    deps: vec![name.clone()],
                })
            }
            TypeShape::Primitive(name) => Ok(ResolvedType::primitive(name)),
            TypeShape::Array(None) => Ok(ResolvedType::primitive("array<any>")),
            TypeShape::Array(Some(element)) => {
                let element = self.resolve_type(element, def_name, field_path)?;
                Ok(ResolvedType {
                    name: format!("array<{}>", element.name),
                    deps: element.deps,
                })
            }
            TypeShape::Union(values) => {
                let mut deps = Vec::new();
                let mut names = Vec::with_capacity(values.len());
                for value in values {
                    let shape = TypeShape::of_value(value, items, def_name, field_path)?;
                    let element = self.resolve_shape(shape, items, def_name, field_path)?;
                    names.push(element.name);
                    deps.extend(element.deps);
                }
                Ok(ResolvedType {
                    name: format!("variant<{}>", names.join(", ")),
                    deps,
                })
            }
        }
    }
}
