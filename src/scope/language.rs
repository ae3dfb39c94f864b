// File classification buckets and their extension sets.

use std::fmt;
use std::str::FromStr;

use crate::error::{MetricsError, Result};

const PY_EXTENSIONS: &[&str] = &[".py"];
const JS_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx"];
const JAVA_EXTENSIONS: &[&str] = &[".java"];
const C_EXTENSIONS: &[&str] = &[".c"];
const CPP_EXTENSIONS: &[&str] = &[".cpp", ".c++"];
const TYPED_EXTENSIONS: &[&str] = &[
    ".java", ".ts", ".tsx", ".c", ".cs", ".cpp", ".c++", ".cc", ".cp", ".cxx", ".h", ".h++",
    ".hh", ".hpp", ".hxx", ".inc", ".inl", ".ipp", ".tcc", ".tpp",
];
const UNTYPED_EXTENSIONS: &[&str] = &[".js", ".jsx", ".py", ".rb", ".ruby", ".perl"];

/// Bucket a repository file can be classified into.
///
/// `Typed` and `Untyped` are independent of the per-language buckets: a
/// `.ts` file lands in both `JavaScript` and `Typed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Python,
    JavaScript,
    Java,
    C,
    Cpp,
    Typed,
    Untyped,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Python,
        Language::JavaScript,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::Typed,
        Language::Untyped,
    ];

    /// Filename suffixes that place a file in this bucket.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => PY_EXTENSIONS,
            Language::JavaScript => JS_EXTENSIONS,
            Language::Java => JAVA_EXTENSIONS,
            Language::C => C_EXTENSIONS,
            Language::Cpp => CPP_EXTENSIONS,
            Language::Typed => TYPED_EXTENSIONS,
            Language::Untyped => UNTYPED_EXTENSIONS,
        }
    }

    /// Short tag used in configuration and output.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::JavaScript => "js",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Typed => "typed",
            Language::Untyped => "untyped",
        }
    }

    /// Whether `path` ends with one of this bucket's suffixes.
    pub fn matches(&self, path: &str) -> bool {
        has_extension(path, self.extensions())
    }
}

/// True suffix match against a set of extensions.
pub fn has_extension(path: &str, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| path.ends_with(ext))
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "py" | "python" => Ok(Language::Python),
            "js" | "javascript" => Ok(Language::JavaScript),
            "java" => Ok(Language::Java),
            "c" => Ok(Language::C),
            "cpp" | "c++" => Ok(Language::Cpp),
            "typed" => Ok(Language::Typed),
            "untyped" => Ok(Language::Untyped),
            _ => Err(MetricsError::InvalidLanguage(s.to_string())),
        }
    }
}
