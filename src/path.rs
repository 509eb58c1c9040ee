//! Route templates and path matching.
//!
//! A template is a `/`-delimited list of segments. A segment that starts with
//! `:` binds the request segment at the same position to that name; any other
//! segment must match byte-for-byte.
//!
//! ```text
//! template  /users/:id/posts/:post_id
//! path      /users/7/posts/9            → { id: "7", post_id: "9" }
//! path      /users/7                    → no match (segment count differs)
//! ```
//!
//! Leading and trailing slashes are ignored on both sides, so `/test`,
//! `/test/` and `test` are the same template. There are no wildcards and no
//! greedy segments: a match always yields exactly the template's parameter
//! set, or nothing.

use std::collections::HashMap;
use std::fmt;

/// Marker that turns a template segment into a named parameter.
const PARAM_MARKER: char = ':';

/// Path parameters extracted by a successful match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed route template.
///
/// Parsing happens once at registration, so the parameter names and count
/// are fixed for the lifetime of the route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
}

/// Why a template was rejected at registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("segment {position} is a parameter marker with no name")]
    EmptyParam { position: usize },
    #[error("parameter `{name}` appears more than once")]
    DuplicateParam { name: String },
}

impl Template {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        for (position, seg) in split(template).enumerate() {
            match seg.strip_prefix(PARAM_MARKER) {
                Some("") => return Err(TemplateError::EmptyParam { position }),
                Some(name) => {
                    let duplicate = segments
                        .iter()
                        .any(|s| matches!(s, Segment::Param(n) if n == name));
                    if duplicate {
                        return Err(TemplateError::DuplicateParam { name: name.to_owned() });
                    }
                    segments.push(Segment::Param(name.to_owned()));
                }
                None => segments.push(Segment::Literal(seg.to_owned())),
            }
        }
        Ok(Self { raw: template.to_owned(), segments })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Names of the parameters this template binds, in segment order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches `path` against the template.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let parts: Vec<&str> = split(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_owned());
                }
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
            }
        }
        Some(Params(params))
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Matches `path` against an unparsed `template`.
///
/// A pure function of its inputs. A lone `:` segment has no name to bind and
/// is compared literally.
pub fn match_path(template: &str, path: &str) -> Option<Params> {
    let tpl: Vec<&str> = split(template).collect();
    let parts: Vec<&str> = split(path).collect();
    if tpl.len() != parts.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (seg, part) in tpl.into_iter().zip(parts) {
        match seg.strip_prefix(PARAM_MARKER) {
            Some(name) if !name.is_empty() => {
                params.insert(name.to_owned(), part.to_owned());
            }
            _ if seg == part => {}
            _ => return None,
        }
    }
    Some(Params(params))
}

/// Trims every leading and trailing `/`, then splits on `/`.
///
/// The root path trims to the empty string and yields a single empty
/// segment, so `/` only ever matches `/`.
fn split(s: &str) -> std::str::Split<'_, char> {
    s.trim_matches('/').split('/')
}
