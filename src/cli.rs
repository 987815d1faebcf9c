use crate::errors::InspectionError;
use crate::inference::{infer_type, widest_type, InspectionCache};
use crate::scope::{filter_by_position, resolve_scope};
use crate::settings::InspectionSettings;
use crate::syntax::{NodeId, NodeIdMap};
use crate::types::Type;
use clap::{App, Arg};
use io::Read;
use log::debug;
use std::fmt;
use std::fs;
use std::io;
use std::iter::ExactSizeIterator;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error(transparent)]
    InputSourceError(#[from] io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    InspectionError(#[from] InspectionError),
}

impl From<String> for CliError {
    fn from(message: String) -> Self {
        CliError::InvalidOption(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Scope,
    Type,
    Widest,
}

impl Mode {
    pub fn variants() -> impl Iterator<Item = Mode> {
        vec![Self::Scope, Self::Type, Self::Widest].into_iter()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Scope => write!(f, "scope"),
            Mode::Type => write!(f, "type"),
            Mode::Widest => write!(f, "widest"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::variants()
            .find(|x| x.to_string() == s)
            .ok_or_else(|| format!("Unknown mode: `{}`", s))
    }
}

#[derive(Debug)]
pub struct InspectOptions {
    mode: Mode,
    node_id: NodeId,
    max_depth: Option<usize>,
    filter: bool,
    filepath: Option<String>,
}

impl InspectOptions {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            mode: Mode::Type,
            node_id,
            max_depth: None,
            filter: false,
            filepath: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn settings(&self) -> InspectionSettings {
        match self.max_depth {
            Some(max_depth) => InspectionSettings::new().with_max_depth(max_depth),
            None => InspectionSettings::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Command {}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&self, args: impl ExactSizeIterator<Item = String>) -> Result<String, CliError> {
        let options = parse_options(args)?;

        let src = if let Some(filepath) = &options.filepath {
            read_from_file(filepath.as_str())?
        } else {
            read_from_stdin()?
        };
        let graph: NodeIdMap = serde_json::from_str(&src)?;

        debug!("[cli] {} nodes, {} at #{}", graph.len(), options.mode, options.node_id);
        inspect(&graph, &options)
    }
}

/// Runs the inspection `options` ask for and renders its result.
pub fn inspect(graph: &NodeIdMap, options: &InspectOptions) -> Result<String, CliError> {
    let settings = options.settings();
    let node_id = options.node_id;

    match options.mode {
        Mode::Scope => {
            let mut scope_by_id = resolve_scope(graph, node_id, None, &settings)?;
            if options.filter {
                let ancestry = graph.ancestry(node_id)?;
                scope_by_id = filter_by_position(graph, &scope_by_id, &ancestry)?;
            }

            let scope = scope_by_id
                .get(&node_id)
                .ok_or_else(|| InspectionError::missing_scope(node_id))?;
            Ok(format!("{}\n", serde_json::to_string_pretty(scope)?))
        }
        Mode::Type => {
            let ty = infer_type(graph, node_id, &settings, &mut InspectionCache::new())?;
            Ok(format!("{}\n", ty))
        }
        Mode::Widest => {
            let ancestry = graph.ancestry(node_id)?;
            let hint = widest_type(graph, &ancestry).unwrap_or(Type::NOT_APPLICABLE);
            Ok(format!("{}\n", hint))
        }
    }
}

fn parse_options(args: impl ExactSizeIterator<Item = String>) -> Result<InspectOptions, CliError> {
    let mode_possible_values = Mode::variants().map(|m| m.to_string()).collect::<Vec<_>>();
    let mode_possible_values: Vec<&str> = mode_possible_values.iter().map(AsRef::as_ref).collect();

    let matches = App::new("pqinspect")
        .arg(
            Arg::with_name("mode")
                .long("mode")
                .takes_value(true)
                .possible_values(&mode_possible_values),
        )
        .arg(
            Arg::with_name("node")
                .long("node")
                .takes_value(true)
                .required(true),
        )
        .arg(Arg::with_name("max-depth").long("max-depth").takes_value(true))
        .arg(
            Arg::with_name("filter")
                .long("filter")
                .help("Hides scope entries that are not visible at the node's position"),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the node graph JSON file to use")
                .required(false)
                .index(1),
        )
        .get_matches_from_safe(args)
        .map_err(|err| CliError::InvalidOption(err.message))?;

    let node_id = matches.value_of("node").unwrap_or_default();
    let node_id = node_id
        .parse::<NodeId>()
        .map_err(|_| format!("Invalid node id: `{}`", node_id))?;
    let mut options = InspectOptions::new(node_id);

    if let Some(mode) = matches.value_of("mode") {
        options.mode = mode.parse::<Mode>()?;
    }

    if let Some(max_depth) = matches.value_of("max-depth") {
        let max_depth = max_depth
            .parse::<usize>()
            .map_err(|_| format!("Invalid max depth: `{}`", max_depth))?;
        options.max_depth = Some(max_depth);
    }

    options.filter = matches.is_present("filter");

    if let Some(filepath) = matches.value_of("INPUT") {
        options.filepath = Some(filepath.to_string());
    }

    Ok(options)
}

fn read_from_stdin() -> Result<String, io::Error> {
    let mut content = String::new();

    io::stdin().read_to_string(&mut content)?;

    Ok(content)
}

fn read_from_file(filename: &str) -> io::Result<String> {
    fs::read_to_string(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::NodeIdMapBuilder;
    use assert_matches::assert_matches;

    fn args(args: &[&str]) -> impl ExactSizeIterator<Item = String> {
        let mut all = vec!["pqinspect".to_string()];
        all.extend(args.iter().map(|arg| arg.to_string()));
        all.into_iter()
    }

    #[test]
    fn parse_mode_and_node() {
        let options =
            parse_options(args(&["--mode", "scope", "--node", "12", "graph.json"])).unwrap();

        assert_eq!(options.mode(), Mode::Scope);
        assert_eq!(options.node_id(), 12);
        assert_eq!(options.filepath.as_deref(), Some("graph.json"));
        assert!(!options.filter);
    }

    #[test]
    fn defaults_to_type_mode() {
        let options = parse_options(args(&["--node", "3", "--max-depth", "8"])).unwrap();

        assert_eq!(options.mode(), Mode::Type);
        assert_eq!(options.settings().max_depth(), 8);
        assert_eq!(options.filepath, None);
    }

    #[test]
    fn invalid_options() {
        assert_matches!(
            parse_options(args(&["--node", "x"])),
            Err(CliError::InvalidOption(_))
        );
        assert_matches!(
            parse_options(args(&["--node", "1", "--mode", "hover"])),
            Err(CliError::InvalidOption(_))
        );
        assert_matches!(parse_options(args(&[])), Err(CliError::InvalidOption(_)));
        assert_matches!(
            parse_options(args(&["--node", "1", "--max-depth", "-1"])),
            Err(CliError::InvalidOption(_))
        );
    }

    #[test]
    fn mode_round_trips_through_display() {
        for mode in Mode::variants() {
            assert_eq!(mode.to_string().parse::<Mode>(), Ok(mode));
        }
    }

    #[test]
    fn inspect_renders_each_mode() {
        // let x = 1 in x
        let mut b = NodeIdMapBuilder::new();
        let one = b.numeric_literal("1");
        let body = b.identifier_expression("x");
        b.let_expression(&[("x", one)], body);
        let graph = b.finish();
        let json = serde_json::to_string(&graph).unwrap();
        let graph: NodeIdMap = serde_json::from_str(&json).unwrap();

        let mut options = InspectOptions::new(body);
        assert_eq!(inspect(&graph, &options).unwrap(), "number\n");

        options.mode = Mode::Scope;
        let scope: serde_json::Value =
            serde_json::from_str(&inspect(&graph, &options).unwrap()).unwrap();
        assert_eq!(scope["x"]["kind"], "KeyValuePair");

        options.mode = Mode::Widest;
        assert_eq!(inspect(&graph, &options).unwrap(), "not applicable\n");
    }

    #[test]
    fn filtered_scope_of_each_body_is_empty() {
        // each 1
        let mut b = NodeIdMapBuilder::new();
        let body = b.numeric_literal("1");
        b.each_expression(body);
        let graph = b.finish();

        let mut options = InspectOptions::new(body);
        options.mode = Mode::Scope;
        let scope: serde_json::Value =
            serde_json::from_str(&inspect(&graph, &options).unwrap()).unwrap();
        assert_eq!(scope["_"]["kind"], "Each");

        options.filter = true;
        assert_eq!(inspect(&graph, &options).unwrap(), "{}\n");
    }

    #[test]
    fn inspect_reports_missing_node() {
        let graph = NodeIdMap::new();
        let options = InspectOptions::new(42);

        assert_matches!(inspect(&graph, &options), Err(CliError::InspectionError(_)));
    }
}
