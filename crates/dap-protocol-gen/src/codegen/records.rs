use crate::error::{CodegenError, Result};
use crate::schema::{Definition, Properties, Property};
use smol_str::{SmolStr, format_smolstr};

use super::{
    BaseCategory, CodeGenerator, FieldDescriptor, RESERVED_NAMES, RecordDescriptor, TypeAlias,
};

impl<'c> CodeGenerator<'c> {
    /// Build a record descriptor for every non-reserved definition, in name order
    pub fn build_records(&self) -> Result<Vec<RecordDescriptor>> {
        let mut records = Vec::with_capacity(self.schema.len());

        for (def_name, def) in self.schema.definitions_sorted() {
            if RESERVED_NAMES.contains(&def_name.as_str()) {
                continue;
            }

            let record = self.build_record(def_name, def)?;
            tracing::debug!(
                record = %record.name,
                category = record.category.as_str(),
                fields = record.fields.len(),
                deps = record.deps.len(),
                "built record"
            );
            records.push(record);
        }

        tracing::info!("built {} records", records.len());
        Ok(records)
    }

    /// Build the record descriptor for a single definition
    pub fn build_record(&self, def_name: &SmolStr, def: &Definition) -> Result<RecordDescriptor> {
        let (base, def) = self.split_base(def_name, def)?;
        let mut record = RecordDescriptor::new(def_name.clone(), base);
        record.description = def.description.clone().unwrap_or_default();

        let (props, required): (&Properties, &[SmolStr]) = match base {
            None => (&def.properties, def.required.as_slice()),
            Some(role) => {
                if let Some(tag_property) = role.tag_source() {
                    record.tag = first_enum_value(def.properties.get(tag_property));
                }

                if role == BaseCategory::Request {
                    let response = companion_response(def_name);
                    record.add_dependency(response.clone());
                    record.aliases.push(TypeAlias {
                        from: "Response".to_string(),
                        to: response.to_string(),
                    });
                }

                let source = role.field_source();
                match def.properties.get(source) {
                    Some(property) => property.object_fields(self.schema, def_name, source)?,
                    None => (&EMPTY_PROPERTIES, &[]),
                }
            }
        };

        for (prop_name, property) in props {
            let (field, deps) = self.build_field(def_name, prop_name, property, required)?;
            for dep in deps {
                record.add_dependency(dep);
            }
            record.fields.push(field);
        }

        Ok(record)
    }

    /// Apply the two-level inheritance convention.
    ///
    /// `allOf: [ref to a role, own body]` yields that role and the body; any
    /// other definition has no base and is its own field source. A lone
    /// `allOf` entry is not a mixin, so the definition keeps its own properties.
    fn split_base<'d>(
        &self,
        def_name: &str,
        def: &'d Definition,
    ) -> Result<(Option<BaseCategory>, &'d Definition)> {
        let [first, rest @ ..] = def.all_of.as_slice() else {
            return Ok((None, def));
        };
        let (Some(reference), [body, extra @ ..]) = (&first.reference, rest) else {
            return Ok((None, def));
        };

        let (base_name, _) = self
            .schema
            .resolve_ref(reference)
            .ok_or_else(|| CodegenError::unknown_ref(reference, def_name, ""))?;
        if !extra.is_empty() {
            return Err(CodegenError::unsupported(
                format!(
                    "allOf with {} entries (at most 2 supported)",
                    def.all_of.len()
                ),
                def_name,
                "",
            ));
        }

        Ok(match BaseCategory::from_name(base_name) {
            Some(role) => (Some(role), body),
            None => (None, def),
        })
    }

    /// Compile one property into a field, returning the records its type references
    fn build_field(
        &self,
        def_name: &str,
        prop_name: &SmolStr,
        property: &Property,
        required: &[SmolStr],
    ) -> Result<(FieldDescriptor, Vec<SmolStr>)> {
        let resolved = self.resolve_type(&property.descriptor, def_name, prop_name)?;

        let mut description = property.description.clone().unwrap_or_default();
        let mut default_value = None;

        let closed = &property.descriptor.closed_enum;
        if let Some(first) = closed.first() {
            description.push_str("\n\nMust be one of the following enumeration values:\n");
            description.push_str(&quoted_list(closed));
            default_value = Some(format!("\"{first}\""));
        }

        let open = &property.descriptor.open_enum;
        if !open.is_empty() {
            description.push_str("\n\nMay be one of the following enumeration values:\n");
            description.push_str(&quoted_list(open));
        }

        let field = FieldDescriptor {
            name: prop_name.clone(),
            ty: resolved.name,
            optional: !required.contains(prop_name),
            description,
            default_value,
        };
        Ok((field, resolved.deps))
    }
}

static EMPTY_PROPERTIES: Properties = Properties::new();

/// `FooRequest` → `FooResponse`; names without the suffix just get it appended
fn companion_response(request_name: &str) -> SmolStr {
    let stem = request_name.strip_suffix("Request").unwrap_or(request_name);
    format_smolstr!("{stem}Response")
}

fn first_enum_value(property: Option<&Property>) -> String {
    property
        .and_then(|p| p.descriptor.closed_enum.first())
        .cloned()
        .unwrap_or_default()
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
