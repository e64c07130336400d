use std::borrow::Cow;
use std::fmt;

use http::Method;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info};

use crate::dispatcher::{Dispatcher, Flavor};

/// Handler/action/params a URI or argv resolved to.
///
/// Missing or empty parts stay `None` so the dispatcher falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTarget {
    pub handler: Option<String>,
    pub action: Option<String>,
    pub params: Vec<String>,
}

impl RouteTarget {
    fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut segments = segments.into_iter().map(Into::into);
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        let handler = segments.next().and_then(non_empty);
        let action = segments.next().and_then(non_empty);
        Self {
            handler,
            action,
            params: segments.collect(),
        }
    }

    /// Positional params as a JSON array.
    #[must_use]
    pub fn params_value(&self) -> Value {
        Value::Array(self.params.iter().cloned().map(Value::String).collect())
    }

    /// Write this target into `dispatcher`'s state. Params are only replaced when present.
    pub fn apply<F: Flavor>(&self, dispatcher: &mut Dispatcher<F>) {
        if let Some(handler) = &self.handler {
            dispatcher.set_handler_name(handler.as_str());
        }
        if let Some(action) = &self.action {
            dispatcher.set_action_name(action.as_str());
        }
        if !self.params.is_empty() {
            dispatcher.set_params(self.params_value());
        }
    }
}

/// Characters kept by [`sanitize_uri`]: letters, digits and URL punctuation.
fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=".contains(c)
}

/// Drop every character that cannot appear in a URL.
#[must_use]
pub fn sanitize_uri(uri: &str) -> Cow<'_, str> {
    if uri.chars().all(is_url_safe) {
        Cow::Borrowed(uri)
    } else {
        Cow::Owned(uri.chars().filter(|c| is_url_safe(*c)).collect())
    }
}

fn strip_query(uri: &str) -> &str {
    uri.split_once('?').map_or(uri, |(path, _)| path)
}

fn percent_decode(segment: &str) -> String {
    urlencoding::decode(segment).map_or_else(|_| segment.to_string(), Cow::into_owned)
}

/// Map `/user/view/7?x=1` to `user` / `view` / `["7"]`.
#[must_use]
pub fn split_uri(uri: &str) -> RouteTarget {
    let sanitized = sanitize_uri(uri);
    let path = strip_query(&sanitized).trim_matches('/');
    if path.is_empty() {
        return RouteTarget::default();
    }
    RouteTarget::from_segments(path.split('/').map(percent_decode))
}

/// Map argv (`main hello world`) to `main` / `hello` / `["world"]`.
#[must_use]
pub fn split_args<S: AsRef<str>>(args: &[S]) -> RouteTarget {
    RouteTarget::from_segments(args.iter().map(|a| a.as_ref().to_string()))
}

/// One entry of the static route table.
#[derive(Debug, Clone)]
pub struct Route {
    method: Method,
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
    controller: String,
    action: String,
}

impl Route {
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    #[must_use]
    pub fn controller(&self) -> &str {
        &self.controller
    }

    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}/{}",
            self.method, self.pattern, self.controller, self.action
        )
    }
}

/// Static route table with a `/handler/action/params...` fallback.
///
/// Patterns use `{name}` placeholders for whole segments; captured values are
/// handed to the action as positional params in pattern order.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. Fails only if the pattern does not compile.
    pub fn add(
        &mut self,
        method: Method,
        pattern: &str,
        controller: impl Into<String>,
        action: impl Into<String>,
    ) -> Result<(), regex::Error> {
        let (regex, param_names) = Self::path_to_regex(pattern)?;
        let route = Route {
            method,
            pattern: pattern.to_string(),
            regex,
            param_names,
            controller: controller.into(),
            action: action.into(),
        };
        debug!(route = %route, "Route added");
        self.routes.push(route);
        Ok(())
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve a request. Table routes are tried in insertion order; without a
    /// match the URI is split positionally.
    #[must_use]
    pub fn route(&self, method: &Method, uri: &str) -> RouteTarget {
        let sanitized = sanitize_uri(uri);
        let path = strip_query(&sanitized);
        let path = format!("/{}", path.trim_matches('/'));

        for route in self.routes.iter().filter(|r| &r.method == method) {
            if let Some(caps) = route.regex.captures(&path) {
                let params: Vec<String> = caps
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|m| percent_decode(m.as_str()))
                    .collect();
                info!(
                    method = %method,
                    path = %path,
                    route_pattern = %route.pattern,
                    params = ?params,
                    "Route matched"
                );
                return RouteTarget {
                    handler: Some(route.controller.clone()),
                    action: Some(route.action.clone()),
                    params,
                };
            }
        }

        debug!(method = %method, path = %path, "No table route matched, splitting URI");
        split_uri(path.as_str())
    }

    /// Convert a path pattern to an anchored regex and its parameter names.
    ///
    /// `/users/{id}/posts/{postId}` becomes `^/users/([^/]+)/posts/([^/]+)$`
    /// with `["id", "postId"]`.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<String>), regex::Error> {
        if path.trim_matches('/').is_empty() {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 5);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/') {
            if segment.starts_with('{') && segment.ends_with('}') {
                let param_name = segment
                    .trim_start_matches('{')
                    .trim_end_matches('}')
                    .to_string();
                pattern.push_str("/([^/]+)");
                param_names.push(param_name);
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push('$');
        Ok((Regex::new(&pattern)?, param_names))
    }
}
