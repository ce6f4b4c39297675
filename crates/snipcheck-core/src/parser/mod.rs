//! Parser adapter for JavaScript snippets.
//!
//! Three interchangeable grammars sit behind [`ParseBackend`]. Each lowers its
//! native tree into the shared [`SyntaxTree`] so the analysis passes never see
//! parser-specific types.

mod swc;
mod tree_sitter;

pub use self::swc::SwcBackend;
pub use self::tree_sitter::{Dialect, TreeSitterBackend};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::syntax::SyntaxTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    #[default]
    Swc,
    TreeSitter,
    TreeSitterTsx,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Swc, Backend::TreeSitter, Backend::TreeSitterTsx];

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Swc => "swc",
            Backend::TreeSitter => "tree-sitter",
            Backend::TreeSitterTsx => "tree-sitter-tsx",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parser backend `{0}` (expected swc, tree-sitter or tree-sitter-tsx)")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|backend| backend.as_str() == s)
            .ok_or_else(|| UnknownBackend(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(SyntaxError),
    #[error("parser backend failed: {0}")]
    Backend(String),
}

pub trait ParseBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse<'src>(&self, source: &'src str) -> Result<SyntaxTree<'src>, ParseError>;
}

static SWC: SwcBackend = SwcBackend;
static TREE_SITTER_JS: TreeSitterBackend = TreeSitterBackend::new(Dialect::JavaScript);
static TREE_SITTER_TSX: TreeSitterBackend = TreeSitterBackend::new(Dialect::Tsx);

pub fn backend(kind: Backend) -> &'static dyn ParseBackend {
    match kind {
        Backend::Swc => &SWC,
        Backend::TreeSitter => &TREE_SITTER_JS,
        Backend::TreeSitterTsx => &TREE_SITTER_TSX,
    }
}

pub fn parse(source: &str, kind: Backend) -> Result<SyntaxTree<'_>, ParseError> {
    backend(kind).parse(source)
}
