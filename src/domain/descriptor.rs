// Static-analysis records produced by the extractor.
// These are plain data: no positions, no references between records.

use serde::{Deserialize, Serialize};

/// A function definition found in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    /// Positional parameter names in declaration order.
    pub inputs: Vec<String>,
    /// Names returned through `return <name>`, deduplicated, order unspecified.
    pub outputs: Vec<String>,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, inputs: Vec<String>, outputs: Vec<String>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
        }
    }
}

/// A call site: `caller` invoked the plain name `callee`.
/// The callee may not resolve to any known function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEdgeDescriptor {
    pub caller: String,
    pub callee: String,
}

impl CallEdgeDescriptor {
    pub fn new(caller: impl Into<String>, callee: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
        }
    }
}

/// A method slot inside a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupChild {
    /// The method was recorded as a function descriptor.
    Resolved(FunctionDescriptor),
    /// The method name is known but no descriptor exists for it
    /// (function extraction disabled, or the definition was skipped).
    Unresolved { name: String },
}

impl GroupChild {
    pub fn name(&self) -> &str {
        match self {
            GroupChild::Resolved(f) => &f.name,
            GroupChild::Unresolved { name } => name,
        }
    }

    pub fn descriptor(&self) -> Option<&FunctionDescriptor> {
        match self {
            GroupChild::Resolved(f) => Some(f),
            GroupChild::Unresolved { .. } => None,
        }
    }

    pub(crate) fn rename(&mut self, new_name: &str) {
        match self {
            GroupChild::Resolved(f) => f.name = new_name.to_string(),
            GroupChild::Unresolved { name } => *name = new_name.to_string(),
        }
    }
}

/// A class and the methods defined directly in its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDescriptor {
    pub name: String,
    pub children: Vec<GroupChild>,
}

impl GroupDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn contains(&self, function_name: &str) -> bool {
        self.children.iter().any(|c| c.name() == function_name)
    }

    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(GroupChild::name)
    }
}

/// Switches controlling what the extractor records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Record classes as groups.
    pub parse_classes: bool,
    /// Record function definitions (and the calls made inside them).
    pub parse_functions: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            parse_classes: true,
            parse_functions: true,
        }
    }
}

/// Everything extracted from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub functions: Vec<FunctionDescriptor>,
    pub edges: Vec<CallEdgeDescriptor>,
    pub groups: Vec<GroupDescriptor>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.edges.is_empty() && self.groups.is_empty()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.iter().find(|f| f.name == name)
    }
}
