use crate::error::{CodegenError, Result};
use std::collections::HashMap;
use std::io::Write;

use super::{BaseCategory, CodeGenerator, EmitCategory, RecordDescriptor};
use crate::schema::DEFINITIONS_PREFIX;

/// One shared declarations sink plus one definitions sink per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSinks<W> {
    pub declarations: W,
    pub requests: W,
    pub responses: W,
    pub events: W,
    pub types: W,
}

impl<W> OutputSinks<W> {
    /// Open every sink with `open`, declarations first then categories in order
    pub fn try_new<E>(
        mut open: impl FnMut(Option<EmitCategory>) -> std::result::Result<W, E>,
    ) -> std::result::Result<Self, E> {
        Ok(Self {
            declarations: open(None)?,
            requests: open(Some(EmitCategory::Request))?,
            responses: open(Some(EmitCategory::Response))?,
            events: open(Some(EmitCategory::Event))?,
            types: open(Some(EmitCategory::Types))?,
        })
    }

    /// The declarations sink for `None`, otherwise that category's definitions sink
    pub fn get(&self, artifact: Option<EmitCategory>) -> &W {
        match artifact {
            None => &self.declarations,
            Some(category) => self.definitions(category),
        }
    }

    pub fn definitions(&self, category: EmitCategory) -> &W {
        match category {
            EmitCategory::Request => &self.requests,
            EmitCategory::Response => &self.responses,
            EmitCategory::Event => &self.events,
            EmitCategory::Types => &self.types,
        }
    }

    pub fn definitions_mut(&mut self, category: EmitCategory) -> &mut W {
        match category {
            EmitCategory::Request => &mut self.requests,
            EmitCategory::Response => &mut self.responses,
            EmitCategory::Event => &mut self.events,
            EmitCategory::Types => &mut self.types,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Option<EmitCategory>, W) -> U) -> OutputSinks<U> {
        OutputSinks {
            declarations: f(None, self.declarations),
            requests: f(Some(EmitCategory::Request), self.requests),
            responses: f(Some(EmitCategory::Response), self.responses),
            events: f(Some(EmitCategory::Event), self.events),
            types: f(Some(EmitCategory::Types), self.types),
        }
    }

    pub fn try_map<U, E>(
        self,
        mut f: impl FnMut(Option<EmitCategory>, W) -> std::result::Result<U, E>,
    ) -> std::result::Result<OutputSinks<U>, E> {
        Ok(OutputSinks {
            declarations: f(None, self.declarations)?,
            requests: f(Some(EmitCategory::Request), self.requests)?,
            responses: f(Some(EmitCategory::Response), self.responses)?,
            events: f(Some(EmitCategory::Event), self.events)?,
            types: f(Some(EmitCategory::Types), self.types)?,
        })
    }

    /// Apply `f` to every sink, declarations first
    pub fn try_for_each<E>(
        &mut self,
        mut f: impl FnMut(Option<EmitCategory>, &mut W) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        f(None, &mut self.declarations)?;
        for category in EmitCategory::ALL {
            f(Some(category), self.definitions_mut(category))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// Depth-first walk state for a single emission run
struct Emitter<'r, 'w, W> {
    index: HashMap<&'r str, &'r RecordDescriptor>,
    state: HashMap<&'r str, VisitState>,
    /// Records currently being emitted, outermost first
    stack: Vec<&'r str>,
    sinks: &'w mut OutputSinks<W>,
}

impl<'r, 'w, W: Write> Emitter<'r, 'w, W> {
    fn visit(&mut self, record: &'r RecordDescriptor) -> Result<()> {
        let name = record.name.as_str();
        self.state.insert(name, VisitState::InProgress);
        self.stack.push(name);

        for dep in &record.deps {
            // Self references are fine: the record is in scope inside its own body
            if dep == name || BaseCategory::from_name(dep).is_some() {
                continue;
            }

            let Some(target) = self.index.get(dep.as_str()).copied() else {
                return Err(CodegenError::MissingDependency {
                    dependency: dep.to_string(),
                    dependent: name.to_string(),
                });
            };

            match self.state.get(target.name.as_str()).copied() {
                Some(VisitState::Done) => {}
                Some(VisitState::InProgress) => return Err(self.cycle_error(target)),
                None => self.visit(target)?,
            }
        }

        self.stack.pop();
        self.state.insert(name, VisitState::Done);

        tracing::debug!(
            record = name,
            category = record.category.as_str(),
            "emitting record"
        );
        record.write_declaration(&mut self.sinks.declarations)?;
        record.write_definition(self.sinks.definitions_mut(record.category))?;
        Ok(())
    }

    fn cycle_error(&self, target: &RecordDescriptor) -> CodegenError {
        let start = self
            .stack
            .iter()
            .position(|n| target.name == *n)
            .unwrap_or(0);
        let mut cycle: Vec<String> = self.stack[start..].iter().map(|n| n.to_string()).collect();
        cycle.push(target.name.to_string());

        CodegenError::CircularRef {
            ref_string: format!("{DEFINITIONS_PREFIX}{}", target.name),
            cycle,
        }
    }
}

impl<'c> CodeGenerator<'c> {
    /// Write `records` into `sinks` in dependency order.
    ///
    /// Request, response and event records are emitted as roots in list
    /// order. Generic types are only emitted when something depends on them.
    /// Each record is written exactly once, after all of its dependencies.
    pub fn emit<W: Write>(
        &self,
        records: &[RecordDescriptor],
        sinks: &mut OutputSinks<W>,
    ) -> Result<()> {
        let layout = &self.layout;
        sinks.try_for_each(|category, sink| match category {
            None => layout.write_declarations_prologue(sink),
            Some(_) => layout.write_definitions_prologue(sink),
        })?;

        let mut emitter = Emitter {
            index: records.iter().map(|r| (r.name.as_str(), r)).collect(),
            state: HashMap::with_capacity(records.len()),
            stack: Vec::new(),
            sinks: &mut *sinks,
        };

        for record in records.iter().filter(|r| r.category.is_message()) {
            if !emitter.state.contains_key(record.name.as_str()) {
                emitter.visit(record)?;
            }
        }

        let emitted = emitter.state.len();
        let skipped = records.len() - emitted;
        if skipped > 0 {
            tracing::debug!("{skipped} unreferenced types not emitted");
        }
        tracing::info!("emitted {emitted} records");

        sinks.try_for_each(|category, sink| match category {
            None => layout.write_declarations_epilogue(sink),
            Some(_) => layout.write_definitions_epilogue(sink),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::ArtifactLayout;
    use super::*;
    use crate::schema::Schema;

    fn record(name: &str, base: Option<BaseCategory>, deps: &[&str]) -> RecordDescriptor {
        let mut record = RecordDescriptor::new(name.into(), base);
        for dep in deps {
            record.add_dependency((*dep).into());
        }
        record
    }

    fn emit(records: &[RecordDescriptor]) -> Result<OutputSinks<String>> {
        let schema = Schema::parse(br#"{ "definitions": {} }"#, "inline").expect("parse");
        let codegen = CodeGenerator::new(&schema, ArtifactLayout::default());
        let mut sinks = OutputSinks::<Vec<u8>>::default();
        codegen.emit(records, &mut sinks)?;
        Ok(sinks.map(|_, bytes| String::from_utf8(bytes).expect("utf8")))
    }

    /// Struct names in declaration order
    fn declared(text: &str) -> Vec<&str> {
        text.lines()
            .filter_map(|l| l.strip_prefix("DAP_DECLARE_STRUCT_TYPEINFO("))
            .filter_map(|l| l.strip_suffix(");"))
            .collect()
    }

    fn defined(text: &str) -> Vec<&str> {
        text.lines()
            .filter_map(|l| l.strip_prefix("DAP_IMPLEMENT_STRUCT_TYPEINFO("))
            .filter_map(|l| l.strip_suffix(','))
            .collect()
    }

    #[test]
    fn test_dependencies_emitted_first() {
        let records = vec![
            record("Breakpoint", None, &["Source"]),
            record(
                "SetBreakpointsRequest",
                Some(BaseCategory::Request),
                &["SetBreakpointsResponse", "Source"],
            ),
            record(
                "SetBreakpointsResponse",
                Some(BaseCategory::Response),
                &["Breakpoint"],
            ),
            record("Source", None, &[]),
        ];
        let out = emit(&records).expect("emit");

        assert_eq!(
            declared(&out.declarations),
            vec![
                "Source",
                "Breakpoint",
                "SetBreakpointsResponse",
                "SetBreakpointsRequest"
            ]
        );
        assert_eq!(defined(&out.types), vec!["Source", "Breakpoint"]);
        assert_eq!(defined(&out.requests), vec!["SetBreakpointsRequest"]);
        assert_eq!(defined(&out.responses), vec!["SetBreakpointsResponse"]);
        assert!(defined(&out.events).is_empty());
    }

    #[test]
    fn test_shared_dependency_emitted_once() {
        let records = vec![
            record("AEvent", Some(BaseCategory::Event), &["Thread"]),
            record("BEvent", Some(BaseCategory::Event), &["Thread", "Thread"]),
            record("Thread", None, &[]),
        ];
        let out = emit(&records).expect("emit");

        assert_eq!(defined(&out.types), vec!["Thread"]);
        assert_eq!(defined(&out.events), vec!["AEvent", "BEvent"]);
        assert_eq!(declared(&out.declarations).len(), 3);
    }

    #[test]
    fn test_unreferenced_types_not_emitted() {
        let records = vec![
            record("Orphan", None, &[]),
            record("StoppedEvent", Some(BaseCategory::Event), &[]),
        ];
        let out = emit(&records).expect("emit");
        assert_eq!(declared(&out.declarations), vec!["StoppedEvent"]);
        assert!(defined(&out.types).is_empty());
    }

    #[test]
    fn test_missing_response_fails() {
        let records = vec![record(
            "PingRequest",
            Some(BaseCategory::Request),
            &["PingResponse"],
        )];
        match emit(&records) {
            Err(CodegenError::MissingDependency {
                dependency,
                dependent,
            }) => {
                assert_eq!(dependency, "PingResponse");
                assert_eq!(dependent, "PingRequest");
            }
            other => panic!("expected missing dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_role_dependencies_satisfied_by_prologue() {
        let records = vec![
            record("Wrapper", None, &["Event"]),
            record("DoneEvent", Some(BaseCategory::Event), &["Wrapper"]),
        ];
        let out = emit(&records).expect("emit");
        assert_eq!(declared(&out.declarations), vec!["Wrapper", "DoneEvent"]);

        let records = vec![record(
            "Envelope",
            Some(BaseCategory::Event),
            &["ProtocolMessage"],
        )];
        assert!(matches!(
            emit(&records),
            Err(CodegenError::MissingDependency { .. })
        ));
    }

    #[test]
    fn test_self_reference_allowed() {
        let records = vec![
            record("ExceptionDetails", None, &["ExceptionDetails"]),
            record(
                "ExceptionInfoResponse",
                Some(BaseCategory::Response),
                &["ExceptionDetails"],
            ),
        ];
        let out = emit(&records).expect("emit");
        assert_eq!(defined(&out.types), vec!["ExceptionDetails"]);
    }

    #[test]
    fn test_cycle_detected() {
        let records = vec![
            record("A", None, &["B"]),
            record("B", None, &["C"]),
            record("C", None, &["A"]),
            record("LoopEvent", Some(BaseCategory::Event), &["A"]),
        ];
        match emit(&records) {
            Err(CodegenError::CircularRef { ref_string, cycle }) => {
                assert_eq!(ref_string, "#/definitions/A");
                assert_eq!(cycle, vec!["A", "B", "C", "A"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_boilerplate_wraps_every_sink() {
        let out = emit(&[]).expect("emit");
        assert!(out.declarations.contains("struct Request {};"));
        assert!(out.declarations.ends_with("#endif  // dap_protocol_h\n"));
        for category in EmitCategory::ALL {
            let text = out.definitions(category);
            assert!(text.contains("#include \"dap/protocol.h\""));
            assert!(text.ends_with("}  // namespace dap\n"));
        }
    }
}
