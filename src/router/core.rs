//! Router core module - route matching for the dispatch pipeline.

use regex::Regex;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum number of path parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the compiled template and
/// are shared by every match; values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Bidirectional mapping between request paths and a route value.
///
/// `parse` turns an incoming path into a route (or fails, which the
/// dispatcher answers with a 404); `print` renders a route back into a path.
/// For every route `r` produced by `parse`, `parse(&print(&r))` yields `r`.
pub trait RouteMatcher: Send + Sync {
    /// The typed route handed to the handler
    type Route: Send;

    fn parse(&self, path: &str) -> Result<Self::Route, RouteError>;

    fn print(&self, route: &Self::Route) -> String;

    /// Short description used in route listings and logs.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// The path did not match any route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteError {
    pub path: String,
}

impl RouteError {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no route matches `{}`", self.path)
    }
}

impl std::error::Error for RouteError {}

/// A path template could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Templates must start with `/`
    NotAbsolute(String),
    /// A `{` without matching `}`, or braces inside a literal segment
    MalformedSegment { template: String, segment: String },
    /// `{}` with no name
    EmptyParam(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::NotAbsolute(t) => write!(f, "path template `{t}` must start with `/`"),
            TemplateError::MalformedSegment { template, segment } => {
                write!(f, "malformed segment `{segment}` in path template `{template}`")
            }
            TemplateError::EmptyParam(t) => write!(f, "empty parameter name in `{t}`"),
        }
    }
}

impl std::error::Error for TemplateError {}

/// Path parameters captured by a [`PathTemplate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: ParamVec,
}

impl PathParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter; later values shadow earlier ones with the same name.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push((Arc::from(name), value.into()));
        self
    }

    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics: if duplicate parameter names exist
    /// at different path depths (e.g., `/org/{id}/team/{team_id}/user/{id}`),
    /// returns the last occurrence (the user id, not the org id).
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Param(Arc<str>),
}

/// Route matcher for templates like `/users/{id}/posts/{post_id}`.
///
/// The template is compiled once into an anchored regex. Captured values are
/// percent-decoded on `parse` and percent-encoded again on `print`. A query
/// string on the incoming path is ignored.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    template: String,
    regex: Regex,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn new(template: &str) -> Result<Self, TemplateError> {
        if !template.starts_with('/') {
            return Err(TemplateError::NotAbsolute(template.to_string()));
        }

        let mut pattern = String::with_capacity(template.len() + 8);
        pattern.push('^');
        let mut segments = Vec::with_capacity(template.matches('/').count());

        for segment in template.split('/').filter(|s| !s.is_empty()) {
            if segment.starts_with('{') && segment.ends_with('}') && segment.len() >= 2 {
                let name = &segment[1..segment.len() - 1];
                if name.is_empty() {
                    return Err(TemplateError::EmptyParam(template.to_string()));
                }
                if name.contains(['{', '}']) {
                    return Err(TemplateError::MalformedSegment {
                        template: template.to_string(),
                        segment: segment.to_string(),
                    });
                }
                pattern.push_str("/([^/]+)");
                segments.push(Segment::Param(Arc::from(name)));
            } else if segment.contains(['{', '}']) {
                return Err(TemplateError::MalformedSegment {
                    template: template.to_string(),
                    segment: segment.to_string(),
                });
            } else {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
                segments.push(Segment::Literal(segment.to_string()));
            }
        }

        if segments.is_empty() {
            pattern.push('/');
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|_| TemplateError::MalformedSegment {
            template: template.to_string(),
            segment: pattern.clone(),
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            segments,
        })
    }

    /// The template this matcher was compiled from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Names of the template parameters, in path order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_ref()),
            Segment::Literal(_) => None,
        })
    }
}

impl RouteMatcher for PathTemplate {
    type Route = PathParams;

    fn parse(&self, path: &str) -> Result<PathParams, RouteError> {
        let path_only = path.split('?').next().unwrap_or(path);
        let Some(captures) = self.regex.captures(path_only) else {
            debug!(template = %self.template, path = %path_only, "Route match attempt failed");
            return Err(RouteError::new(path_only));
        };

        let mut params = ParamVec::new();
        for (name, capture) in self.param_names().zip(captures.iter().skip(1)) {
            let raw = capture.map(|m| m.as_str()).unwrap_or_default();
            let value = match urlencoding::decode(raw) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => {
                    warn!(template = %self.template, param = %name, "Path parameter is not valid UTF-8 after decoding");
                    return Err(RouteError::new(path_only));
                }
            };
            params.push((Arc::from(name), value));
        }
        Ok(PathParams { params })
    }

    fn print(&self, route: &PathParams) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut out = String::with_capacity(self.template.len());
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Param(name) => {
                    out.push_str(&urlencoding::encode(route.get(name).unwrap_or_default()))
                }
            }
        }
        out
    }

    fn describe(&self) -> String {
        self.template.clone()
    }
}
