use super::sources::{HttpSource, LocalSource, Source, SourceType};
use crate::codegen::{ArtifactLayout, OutputPaths};
use miette::{IntoDiagnostic, Result, WrapErr, miette};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub source: Source,
    pub output: OutputConfig,
    /// Formatter program; `None` means use clang-format when it is installed
    pub formatter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub paths: OutputPaths,
    pub layout: ArtifactLayout,
}

impl Config {
    /// Read a config file, resolving relative paths against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_kdl(&text)?;
        let base = path.parent().unwrap_or(Path::new(""));
        Ok(config.relative_to(base))
    }

    pub fn from_kdl(text: &str) -> Result<Self> {
        let doc = text
            .parse::<kdl::KdlDocument>()
            .map_err(|e| miette!("Failed to parse KDL: {}", e))?;

        let mut source: Option<Source> = None;
        let mut output: Option<OutputConfig> = None;
        let mut formatter: Option<String> = None;

        for node in doc.nodes() {
            match node.name().value() {
                "source" => {
                    if source.is_some() {
                        return Err(miette!("Multiple source blocks found"));
                    }
                    source = Some(parse_source(node)?);
                }
                "output" => {
                    if output.is_some() {
                        return Err(miette!("Multiple output blocks found"));
                    }
                    output = Some(parse_output(node)?);
                }
                "formatter" => {
                    formatter = Some(string_arg(node)?.to_string());
                }
                other => {
                    return Err(miette!("Unknown config node: {}", other));
                }
            }
        }

        Ok(Config {
            source: source.ok_or_else(|| miette!("Missing source block"))?,
            output: output.ok_or_else(|| miette!("Missing output block"))?,
            formatter,
        })
    }

    /// Resolve every relative path in the config against `base`
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |path: PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };

        self.source.source_type = match self.source.source_type {
            SourceType::Local(local) => SourceType::Local(LocalSource {
                path: resolve(local.path),
            }),
            SourceType::Http(http) => SourceType::Http(HttpSource {
                cache: http.cache.map(resolve),
                ..http
            }),
        };
        self.output.paths = self.output.paths.relative_to(base);
        self
    }
}

/// The single string argument of a `name "value"` node
fn string_arg(node: &kdl::KdlNode) -> Result<&str> {
    node.entries()
        .first()
        .filter(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| miette!("{} expects a string value", node.name().value()))
}

fn parse_output(node: &kdl::KdlNode) -> Result<OutputConfig> {
    let children = node
        .children()
        .ok_or_else(|| miette!("output block has no children"))?;

    let mut declarations: Option<PathBuf> = None;
    let mut requests: Option<PathBuf> = None;
    let mut responses: Option<PathBuf> = None;
    let mut events: Option<PathBuf> = None;
    let mut types: Option<PathBuf> = None;
    let mut layout = ArtifactLayout::default();

    for child in children.nodes() {
        match child.name().value() {
            "declarations" => declarations = Some(PathBuf::from(string_arg(child)?)),
            "requests" => requests = Some(PathBuf::from(string_arg(child)?)),
            "responses" => responses = Some(PathBuf::from(string_arg(child)?)),
            "events" => events = Some(PathBuf::from(string_arg(child)?)),
            "types" => types = Some(PathBuf::from(string_arg(child)?)),
            "namespace" => layout.namespace = string_arg(child)?.to_string(),
            "header-include" => layout.header_include = string_arg(child)?.to_string(),
            other => {
                return Err(miette!("Unknown output field: {}", other));
            }
        }
    }

    let paths = OutputPaths {
        declarations: declarations.ok_or_else(|| miette!("Missing declarations path"))?,
        requests: requests.ok_or_else(|| miette!("Missing requests path"))?,
        responses: responses.ok_or_else(|| miette!("Missing responses path"))?,
        events: events.ok_or_else(|| miette!("Missing events path"))?,
        types: types.ok_or_else(|| miette!("Missing types path"))?,
    };

    Ok(OutputConfig { paths, layout })
}

fn parse_source(node: &kdl::KdlNode) -> Result<Source> {
    let name = string_arg(node)
        .map_err(|_| miette!("source expects a name as first argument"))?
        .to_string();

    let type_str = node
        .get("type")
        .and_then(|v| v.as_string())
        .ok_or_else(|| miette!("source {} missing type attribute", name))?;

    let children = node
        .children()
        .ok_or_else(|| miette!("source {} has no children", name))?;

    let source_type = match type_str {
        "http" => parse_http_source(children)?,
        "local" => parse_local_source(children)?,
        other => return Err(miette!("Unknown source type: {}", other)),
    };

    Ok(Source { name, source_type })
}

fn parse_http_source(children: &kdl::KdlDocument) -> Result<SourceType> {
    let mut url: Option<String> = None;
    let mut cache: Option<PathBuf> = None;

    for child in children.nodes() {
        match child.name().value() {
            "url" => url = Some(string_arg(child)?.to_string()),
            "cache" => cache = Some(PathBuf::from(string_arg(child)?)),
            other => {
                return Err(miette!("Unknown http source field: {}", other));
            }
        }
    }

    Ok(SourceType::Http(HttpSource {
        url: url.ok_or_else(|| miette!("Missing url"))?,
        cache,
    }))
}

fn parse_local_source(children: &kdl::KdlDocument) -> Result<SourceType> {
    let mut path: Option<PathBuf> = None;

    for child in children.nodes() {
        match child.name().value() {
            "path" => path = Some(PathBuf::from(string_arg(child)?)),
            other => {
                return Err(miette!("Unknown local source field: {}", other));
            }
        }
    }

    Ok(SourceType::Local(LocalSource {
        path: path.ok_or_else(|| miette!("Missing path"))?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
source "debug-protocol" type="http" {
    url "https://example.com/debugProtocol.json"
    cache "target/debugProtocol.json"
}
output {
    declarations "include/dap/protocol.h"
    requests "src/protocol_requests.cpp"
    responses "src/protocol_response.cpp"
    events "src/protocol_events.cpp"
    types "src/protocol_types.cpp"
}
formatter "clang-format-18"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_kdl(CONFIG).expect("parse config");

        assert_eq!(config.source.name, "debug-protocol");
        assert_eq!(
            config.source.source_type,
            SourceType::Http(HttpSource {
                url: "https://example.com/debugProtocol.json".to_string(),
                cache: Some(PathBuf::from("target/debugProtocol.json")),
            })
        );
        assert_eq!(
            config.output.paths.declarations,
            PathBuf::from("include/dap/protocol.h")
        );
        assert_eq!(
            config.output.paths.types,
            PathBuf::from("src/protocol_types.cpp")
        );
        assert_eq!(config.output.layout, ArtifactLayout::default());
        assert_eq!(config.formatter.as_deref(), Some("clang-format-18"));
    }

    #[test]
    fn test_layout_overrides() {
        let text = r#"
source "local" type="local" { path "schema.json"; }
output {
    declarations "a.h"
    requests "r.cpp"
    responses "s.cpp"
    events "e.cpp"
    types "t.cpp"
    namespace "debugger"
    header-include "debugger/protocol.h"
}
"#;
        let config = Config::from_kdl(text).expect("parse config");
        assert_eq!(config.output.layout.namespace, "debugger");
        assert_eq!(config.output.layout.header_include, "debugger/protocol.h");
        assert!(config.formatter.is_none());
        assert_eq!(
            config.source.source_type,
            SourceType::Local(LocalSource {
                path: PathBuf::from("schema.json")
            })
        );
    }

    #[test]
    fn test_relative_paths_resolved_against_config_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("protocol_gen.kdl");
        std::fs::write(&path, CONFIG).expect("write config");

        let config = Config::load(&path).expect("load config");
        match &config.source.source_type {
            SourceType::Http(http) => {
                assert_eq!(http.url, "https://example.com/debugProtocol.json");
                assert_eq!(
                    http.cache.as_deref(),
                    Some(dir.path().join("target/debugProtocol.json").as_path())
                );
            }
            other => panic!("unexpected source: {other:?}"),
        }
        assert_eq!(
            config.output.paths.events,
            dir.path().join("src/protocol_events.cpp")
        );
    }

    #[test]
    fn test_missing_output_path_fails() {
        let text = r#"
source "local" type="local" { path "schema.json"; }
output {
    declarations "a.h"
    requests "r.cpp"
    responses "s.cpp"
    events "e.cpp"
}
"#;
        let err = Config::from_kdl(text).expect_err("types missing");
        assert!(err.to_string().contains("Missing types path"));
    }

    #[test]
    fn test_unknown_nodes_rejected() {
        let err = Config::from_kdl("plugins \"x\"").expect_err("unknown node");
        assert!(err.to_string().contains("Unknown config node: plugins"));

        let text = r#"source "s" type="git" { repo "x"; }"#;
        let err = Config::from_kdl(text).expect_err("unknown source type");
        assert!(err.to_string().contains("Unknown source type: git"));

        let text = r#"source "s" type="http" { url "x"; branch "main"; }"#;
        let err = Config::from_kdl(text).expect_err("unknown field");
        assert!(err.to_string().contains("Unknown http source field: branch"));
    }

    #[test]
    fn test_missing_source_fails() {
        let text = r#"
output {
    declarations "a.h"
    requests "r.cpp"
    responses "s.cpp"
    events "e.cpp"
    types "t.cpp"
}
"#;
        let err = Config::from_kdl(text).expect_err("no source");
        assert!(err.to_string().contains("Missing source block"));
    }
}
