//! Ordered fallback-path rules.
//!
//! A [`RouteRule`] is the argument list of one `try_files` directive: path
//! templates evaluated in order, first existing file wins.

/// The placeholder replaced by the route-relative request path.
pub const URI_VARIABLE: &str = "$uri";

/// One candidate path pattern, e.g. `$uri`, `$uri.html`, `$uri/` or `/docs/index.html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate(String);

impl PathTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A literal template names a fixed file and ignores the request path.
    pub fn is_literal(&self) -> bool {
        !self.0.contains(URI_VARIABLE)
    }

    /// A trailing slash means "this directory's index document".
    pub fn is_directory(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Substitute every `$uri` with `request_path`.
    pub fn expand(&self, request_path: &str) -> String {
        self.0.replace(URI_VARIABLE, request_path)
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered list of path templates. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    templates: Vec<PathTemplate>,
}

impl RouteRule {
    pub fn new<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: templates.into_iter().map(PathTemplate::new).collect(),
        }
    }

    /// Built-in list used when no rule could be extracted:
    /// `$uri $uri.html $uri/<index> /<index>`.
    pub fn default_for(index_document: &str) -> Self {
        Self::new([
            URI_VARIABLE.to_string(),
            format!("{URI_VARIABLE}.html"),
            format!("{URI_VARIABLE}/{index_document}"),
            format!("/{index_document}"),
        ])
    }

    pub fn templates(&self) -> &[PathTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
