//! Text shape of the generated C++ artifacts.

use std::io::{self, Write};

use super::utils::{sanitize_name, write_comment};
use super::{ArtifactLayout, BaseCategory, RecordDescriptor};

const NOTICE: &str = "\
// @generated by dap-protocol-gen. DO NOT EDIT.
//
// This file was automatically generated from the debug adapter protocol
// JSON schema. Any manual changes will be overwritten on the next
// regeneration.
";

const TYPEINFO_IMPL: &str = "DAP_IMPLEMENT_STRUCT_TYPEINFO(";
/// Continuation indent of the typeinfo argument list
const TYPEINFO_INDENT: usize = 20;

impl ArtifactLayout {
    fn guard(&self) -> String {
        let ns: String = self
            .namespace
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{ns}_protocol_h")
    }

    pub(super) fn write_declarations_prologue(&self, w: &mut impl Write) -> io::Result<()> {
        let guard = self.guard();
        write!(w, "{NOTICE}")?;
        writeln!(w)?;
        writeln!(w, "#ifndef {guard}")?;
        writeln!(w, "#define {guard}")?;
        writeln!(w)?;
        for header in ["optional.h", "typeinfo.h", "typeof.h", "variant.h"] {
            writeln!(w, "#include \"{header}\"")?;
        }
        writeln!(w)?;
        for header in ["string", "type_traits", "vector"] {
            writeln!(w, "#include <{header}>")?;
        }
        writeln!(w)?;
        writeln!(w, "namespace {} {{", self.namespace)?;
        writeln!(w)?;
        for role in [
            BaseCategory::Request,
            BaseCategory::Response,
            BaseCategory::Event,
        ] {
            writeln!(w, "struct {} {{}};", role.as_str())?;
        }
        writeln!(w)
    }

    pub(super) fn write_declarations_epilogue(&self, w: &mut impl Write) -> io::Result<()> {
        writeln!(w, "}}  // namespace {}", self.namespace)?;
        writeln!(w)?;
        writeln!(w, "#endif  // {}", self.guard())
    }

    pub(super) fn write_definitions_prologue(&self, w: &mut impl Write) -> io::Result<()> {
        write!(w, "{NOTICE}")?;
        writeln!(w)?;
        writeln!(w, "#include \"{}\"", self.header_include)?;
        writeln!(w)?;
        writeln!(w, "namespace {} {{", self.namespace)?;
        writeln!(w)
    }

    pub(super) fn write_definitions_epilogue(&self, w: &mut impl Write) -> io::Result<()> {
        writeln!(w, "}}  // namespace {}", self.namespace)
    }
}

impl RecordDescriptor {
    /// Write the struct declaration and its typeinfo declaration
    pub fn write_declaration(&self, w: &mut impl Write) -> io::Result<()> {
        let name = &self.name;

        if !self.description.is_empty() {
            write_comment(w, "", &self.description)?;
        }
        match self.base {
            Some(base) => writeln!(w, "struct {name} : public {} {{", base.as_str())?,
            None => writeln!(w, "struct {name} {{")?,
        }

        for alias in &self.aliases {
            writeln!(w, "  using {} = {};", alias.from, alias.to)?;
        }
        writeln!(w)?;

        writeln!(w, "  {name}();")?;
        writeln!(w, "  ~{name}();")?;
        writeln!(w)?;

        for field in &self.fields {
            if !field.description.is_empty() {
                write_comment(w, "  ", &field.description)?;
            }
            let ident = sanitize_name(&field.name);
            match (&field.default_value, field.optional) {
                (_, true) => writeln!(w, "  optional<{}> {ident};", field.ty)?,
                (Some(default), false) => writeln!(w, "  {} {ident} = {default};", field.ty)?,
                (None, false) => writeln!(w, "  {} {ident};", field.ty)?,
            }
        }

        writeln!(w, "}};")?;
        writeln!(w)?;
        writeln!(w, "DAP_DECLARE_STRUCT_TYPEINFO({name});")?;
        writeln!(w)
    }

    /// Write the constructor, destructor and typeinfo implementation
    pub fn write_definition(&self, w: &mut impl Write) -> io::Result<()> {
        let name = &self.name;
        let indent = " ".repeat(TYPEINFO_INDENT);

        writeln!(w, "{name}::{name}() = default;")?;
        writeln!(w, "{name}::~{name}() = default;")?;
        write!(w, "{TYPEINFO_IMPL}{name},\n{indent}\"{}\"", self.tag)?;
        for field in &self.fields {
            write!(
                w,
                ",\n{indent}DAP_FIELD({}, \"{}\")",
                sanitize_name(&field.name),
                field.name
            )?;
        }
        writeln!(w, ");")?;
        writeln!(w)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{FieldDescriptor, TypeAlias};
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).expect("render");
        String::from_utf8(out).expect("utf8")
    }

    fn field(name: &str, ty: &str, optional: bool, default: Option<&str>) -> FieldDescriptor {
        FieldDescriptor {
            name: name.into(),
            ty: ty.to_string(),
            optional,
            description: String::new(),
            default_value: default.map(str::to_string),
        }
    }

    fn request() -> RecordDescriptor {
        let mut record = RecordDescriptor::new("PauseRequest".into(), Some(BaseCategory::Request));
        record.description = "Pause a thread.".to_string();
        record.tag = "pause".to_string();
        record.aliases.push(TypeAlias {
            from: "Response".to_string(),
            to: "PauseResponse".to_string(),
        });
        let mut thread_id = field("threadId", "integer", false, None);
        thread_id.description = "Pause execution for this thread.".to_string();
        record.fields.push(thread_id);
        record
            .fields
            .push(field("mode", "string", false, Some("\"all\"")));
        record
            .fields
            .push(field("default", "string", true, Some("\"x\"")));
        record
    }

    #[test]
    fn test_write_declaration() {
        let text = render(|w| request().write_declaration(w));
        assert_eq!(
            text,
            "\
// Pause a thread.
struct PauseRequest : public Request {
  using Response = PauseResponse;

  PauseRequest();
  ~PauseRequest();

  // Pause execution for this thread.
  integer threadId;
  string mode = \"all\";
  optional<string> def;
};

DAP_DECLARE_STRUCT_TYPEINFO(PauseRequest);

"
        );
    }

    #[test]
    fn test_write_declaration_without_base() {
        let mut record = RecordDescriptor::new("Point".into(), None);
        record.fields.push(field("x", "integer", false, None));
        let text = render(|w| record.write_declaration(w));
        assert_eq!(
            text,
            "struct Point {\n\n  Point();\n  ~Point();\n\n  integer x;\n};\n\nDAP_DECLARE_STRUCT_TYPEINFO(Point);\n\n"
        );
    }

    #[test]
    fn test_write_declaration_without_fields() {
        let record = RecordDescriptor::new("Empty".into(), Some(BaseCategory::Event));
        let text = render(|w| record.write_declaration(w));
        assert!(text.starts_with("struct Empty : public Event {\n\n  Empty();\n  ~Empty();\n\n};\n"));
    }

    #[test]
    fn test_write_definition() {
        let text = render(|w| request().write_definition(w));
        assert_eq!(
            text,
            "\
PauseRequest::PauseRequest() = default;
PauseRequest::~PauseRequest() = default;
DAP_IMPLEMENT_STRUCT_TYPEINFO(PauseRequest,
                    \"pause\",
                    DAP_FIELD(threadId, \"threadId\"),
                    DAP_FIELD(mode, \"mode\"),
                    DAP_FIELD(def, \"default\"));

"
        );
    }

    #[test]
    fn test_boilerplate() {
        let layout = ArtifactLayout {
            namespace: "dbg".to_string(),
            header_include: "dbg/protocol.h".to_string(),
        };

        let prologue = render(|w| layout.write_declarations_prologue(w));
        assert!(prologue.starts_with("// @generated by dap-protocol-gen. DO NOT EDIT."));
        assert!(prologue.contains("#ifndef dbg_protocol_h\n#define dbg_protocol_h\n"));
        assert!(prologue.contains("#include \"variant.h\"\n"));
        assert!(prologue.contains("#include <vector>\n"));
        assert!(prologue.ends_with(
            "namespace dbg {\n\nstruct Request {};\nstruct Response {};\nstruct Event {};\n\n"
        ));

        let epilogue = render(|w| layout.write_declarations_epilogue(w));
        assert_eq!(epilogue, "}  // namespace dbg\n\n#endif  // dbg_protocol_h\n");

        let prologue = render(|w| layout.write_definitions_prologue(w));
        assert!(prologue.ends_with("#include \"dbg/protocol.h\"\n\nnamespace dbg {\n\n"));

        let epilogue = render(|w| layout.write_definitions_epilogue(w));
        assert_eq!(epilogue, "}  // namespace dbg\n");
    }

    #[test]
    fn test_nested_namespace_guard() {
        let layout = ArtifactLayout {
            namespace: "tools::dap".to_string(),
            ..ArtifactLayout::default()
        };
        let prologue = render(|w| layout.write_declarations_prologue(w));
        assert!(prologue.contains("#ifndef tools__dap_protocol_h"));
    }
}
