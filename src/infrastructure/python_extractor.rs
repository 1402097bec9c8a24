//! Python descriptor extraction using tree-sitter-python.
//!
//! Walks the syntax tree once, keeping a stack of open function names:
//! - `function_definition` records a `FunctionDescriptor` (name, positional
//!   parameters, names returned by `return <name>`),
//! - `call` with a plain-name callee records a `CallEdgeDescriptor` from the
//!   innermost open function,
//! - `class_definition` records a `GroupDescriptor` whose children are the
//!   methods defined directly in the class body.
//!
//! Functions are keyed by name only. A later definition with the same name
//! replaces the earlier descriptor's data but keeps its position.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::domain::{
    CallEdgeDescriptor, ExtractOptions, Extraction, FunctionDescriptor, GroupChild,
    GroupDescriptor,
};
use crate::error::ExtractError;
use crate::ports::{DescriptorExtractor, DiagnosticSink};

/// Parse Python source, failing on any syntax error.
pub fn parse_python(source: &str) -> Result<Tree, ExtractError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ExtractError::Language(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ExtractError::Language("parser produced no tree".to_string()))?;

    let root = tree.root_node();
    let invalid = if root.has_error() {
        Some(first_error(root).unwrap_or(root))
    } else {
        first_rejected(root)
    };
    if let Some(at) = invalid {
        let pos = at.start_position();
        return Err(ExtractError::Syntax {
            line: pos.row + 1,
            column: pos.column + 1,
        });
    }
    Ok(tree)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found
}

/// Constructs the grammar accepts but Python 3 does not: Python 2 `print` and
/// `exec` statements, and a parameter without a default after one with a
/// default.
fn first_rejected(node: Node) -> Option<Node> {
    match node.kind() {
        "print_statement" | "exec_statement" => return Some(node),
        "parameters" | "lambda_parameters" => {
            if let Some(param) = required_after_default(node) {
                return Some(param);
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_rejected);
    found
}

fn required_after_default(params: Node) -> Option<Node> {
    let mut seen_default = false;
    let mut cursor = params.walk();
    for child in params.named_children(&mut cursor) {
        match child.kind() {
            "default_parameter" | "typed_default_parameter" => seen_default = true,
            "identifier" if seen_default => return Some(child),
            "typed_parameter" => match child.named_child(0) {
                Some(inner) if inner.kind() == "identifier" => {
                    if seen_default {
                        return Some(child);
                    }
                }
                // `*args: T` / `**kw: T`: keyword-only from here on.
                _ => return None,
            },
            "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" => {
                return None
            }
            _ => {}
        }
    }
    None
}

/// Extract descriptors from Python source text.
pub fn extract_source(source: &str, options: ExtractOptions) -> Result<Extraction, ExtractError> {
    let tree = parse_python(source)?;
    Ok(extract_tree(&tree, source.as_bytes(), options))
}

/// Extract descriptors from an already parsed tree.
pub fn extract_tree(tree: &Tree, source: &[u8], options: ExtractOptions) -> Extraction {
    let mut visitor = Visitor::new(source, options);
    visitor.visit(tree.root_node());
    visitor.finish()
}

/// File-based extractor. Failures go to the diagnostic sink and produce an
/// empty `Extraction`.
pub struct PythonExtractor<S: DiagnosticSink> {
    sink: S,
}

impl<S: DiagnosticSink> PythonExtractor<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn try_extract_file(
        &self,
        path: &Path,
        options: ExtractOptions,
    ) -> Result<Extraction, ExtractError> {
        let source = std::fs::read_to_string(path)?;
        extract_source(&source, options)
    }
}

impl<S: DiagnosticSink> DescriptorExtractor for PythonExtractor<S> {
    fn extract_file(&self, path: &Path, options: ExtractOptions) -> Extraction {
        match self.try_extract_file(path, options) {
            Ok(extraction) => {
                log::info!(
                    "Extracted {} functions, {} calls, {} classes from {}",
                    extraction.functions.len(),
                    extraction.edges.len(),
                    extraction.groups.len(),
                    path.display()
                );
                extraction
            }
            Err(e) => {
                let message = format!("Error parsing file {}: {}", path.display(), e);
                log::warn!("{}", message);
                self.sink.report(&message);
                Extraction::default()
            }
        }
    }
}

struct Visitor<'s> {
    source: &'s [u8],
    options: ExtractOptions,
    func_stack: Vec<String>,
    functions: Vec<FunctionDescriptor>,
    function_slots: HashMap<String, usize>,
    edges: Vec<CallEdgeDescriptor>,
    groups: Vec<GroupDescriptor>,
}

impl<'s> Visitor<'s> {
    fn new(source: &'s [u8], options: ExtractOptions) -> Self {
        Self {
            source,
            options,
            func_stack: Vec::new(),
            functions: Vec::new(),
            function_slots: HashMap::new(),
            edges: Vec::new(),
            groups: Vec::new(),
        }
    }

    fn finish(self) -> Extraction {
        Extraction {
            functions: self.functions,
            edges: self.edges,
            groups: self.groups,
        }
    }

    fn text(&self, node: Node) -> Option<String> {
        node.utf8_text(self.source).ok().map(str::to_string)
    }

    fn visit(&mut self, node: Node) {
        match node.kind() {
            "function_definition" => self.visit_function(node, &[]),
            "decorated_definition" => self.visit_decorated(node),
            "class_definition" => self.visit_class(node),
            "call" => self.visit_call(node),
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        for child in children {
            self.visit(child);
        }
    }

    /// Calls in a function's decorators belong to that function.
    fn visit_decorated(&mut self, node: Node) {
        match node.child_by_field_name("definition") {
            Some(definition)
                if definition.kind() == "function_definition" && self.options.parse_functions =>
            {
                let mut cursor = node.walk();
                let decorators: Vec<Node> = node
                    .named_children(&mut cursor)
                    .filter(|c| c.kind() == "decorator")
                    .collect();
                self.visit_function(definition, &decorators);
            }
            _ => self.visit_children(node),
        }
    }

    /// Parameters and body are visited in source order, then `decorators`,
    /// all with the function open.
    fn visit_function(&mut self, node: Node, decorators: &[Node]) {
        if !self.options.parse_functions {
            return;
        }
        let Some(name) = node
            .child_by_field_name("name")
            .and_then(|n| self.text(n))
        else {
            return;
        };

        let inputs = node
            .child_by_field_name("parameters")
            .map(|p| self.positional_parameters(p))
            .unwrap_or_default();
        let mut returns = BTreeSet::new();
        self.collect_returns(node, &mut returns);

        self.record_function(FunctionDescriptor::new(
            name.clone(),
            inputs,
            returns.into_iter().collect(),
        ));

        self.func_stack.push(name);
        self.visit_children(node);
        for decorator in decorators {
            self.visit_children(*decorator);
        }
        self.func_stack.pop();
    }

    fn record_function(&mut self, descriptor: FunctionDescriptor) {
        match self.function_slots.get(&descriptor.name) {
            Some(&slot) => self.functions[slot] = descriptor,
            None => {
                self.function_slots
                    .insert(descriptor.name.clone(), self.functions.len());
                self.functions.push(descriptor);
            }
        }
    }

    /// Positional parameter names. Stops at `*`, `*args` or `**kwargs`:
    /// everything after them is keyword-only.
    fn positional_parameters(&self, params: Node) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = params.walk();
        for child in params.named_children(&mut cursor) {
            let name_node = match child.kind() {
                "identifier" => Some(child),
                "typed_parameter" => match child.named_child(0) {
                    Some(inner) if inner.kind() == "identifier" => Some(inner),
                    // `*args: T` / `**kw: T`
                    _ => break,
                },
                "default_parameter" | "typed_default_parameter" => {
                    child.child_by_field_name("name")
                }
                "positional_separator" => continue,
                "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" => break,
                _ => None,
            };
            if let Some(name) = name_node.and_then(|n| self.text(n)) {
                names.push(name);
            }
        }
        names
    }

    /// Every `return <name>` anywhere below `node`, nested definitions included.
    fn collect_returns(&self, node: Node, out: &mut BTreeSet<String>) {
        if node.kind() == "return_statement" {
            if let Some(value) = node.named_child(0).map(unparenthesize) {
                if value.kind() == "identifier" {
                    if let Some(name) = self.text(value) {
                        out.insert(name);
                    }
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.collect_returns(child, out);
        }
    }

    fn visit_call(&mut self, node: Node) {
        let callee = node
            .child_by_field_name("function")
            .map(unparenthesize)
            .filter(|f| f.kind() == "identifier")
            .and_then(|f| self.text(f));

        if let (Some(callee), Some(caller)) = (callee, self.func_stack.last()) {
            self.edges
                .push(CallEdgeDescriptor::new(caller.clone(), callee));
        }
        self.visit_children(node);
    }

    fn visit_class(&mut self, node: Node) {
        let name = node
            .child_by_field_name("name")
            .and_then(|n| self.text(n));

        let slot = match (self.options.parse_classes, name) {
            (true, Some(name)) => {
                self.groups.push(GroupDescriptor::new(name));
                Some(self.groups.len() - 1)
            }
            _ => None,
        };

        // The body goes first so the class' own methods are known when the
        // group's children are resolved.
        self.visit_children(node);

        if let Some(slot) = slot {
            let children = node
                .child_by_field_name("body")
                .map(|body| self.method_children(body))
                .unwrap_or_default();
            self.groups[slot].children = children;
        }
    }

    fn method_children(&self, body: Node) -> Vec<GroupChild> {
        let mut children = Vec::new();
        let mut cursor = body.walk();
        for stmt in body.named_children(&mut cursor) {
            let definition = match stmt.kind() {
                "function_definition" => Some(stmt),
                "decorated_definition" => stmt
                    .child_by_field_name("definition")
                    .filter(|d| d.kind() == "function_definition"),
                _ => None,
            };
            let Some(name) = definition
                .and_then(|d| d.child_by_field_name("name"))
                .and_then(|n| self.text(n))
            else {
                continue;
            };
            let child = match self.function_slots.get(&name) {
                Some(&slot) => GroupChild::Resolved(self.functions[slot].clone()),
                None => GroupChild::Unresolved { name },
            };
            children.push(child);
        }
        children
    }
}

fn unparenthesize(mut node: Node) -> Node {
    while node.kind() == "parenthesized_expression" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}
