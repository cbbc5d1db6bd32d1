//! RDF terms – the resources and literals stored in a graph.
//!
//! A [`Resource`] is either an IRI or a blank node.  Both are backed by an
//! `Arc<str>`, so cloning a handle is cheap and two handles naming the same
//! node compare equal.  A [`Value`] is whatever may sit in object position:
//! a resource or a [`Literal`].

use std::fmt;
use std::sync::Arc;

// ───────────────────────────────────────── resource ──────────

/// A graph node: subject, predicate, or resource-valued object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Iri(Arc<str>),
    /// Blank node label, without the `_:` prefix.
    Blank(Arc<str>),
}

impl Resource {
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Resource::Iri(Arc::from(iri.as_ref()))
    }

    pub fn blank(label: impl AsRef<str>) -> Self {
        Resource::Blank(Arc::from(label.as_ref()))
    }

    /// The IRI, or `None` for blank nodes.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Resource::Iri(iri) => Some(iri),
            Resource::Blank(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Resource::Blank(_))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Iri(iri) => write!(f, "<{iri}>"),
            Resource::Blank(label) => write!(f, "_:{label}"),
        }
    }
}

// ───────────────────────────────────────── literal ───────────

/// Either a datatype IRI or a language tag qualifies a literal, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Plain,
    Typed(Resource),
    Lang(Arc<str>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub lexical: Arc<str>,
    pub kind: LiteralKind,
}

impl Literal {
    pub fn plain(lexical: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            kind: LiteralKind::Plain,
        }
    }

    pub fn typed(lexical: impl AsRef<str>, datatype: Resource) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            kind: LiteralKind::Typed(datatype),
        }
    }

    pub fn lang(lexical: impl AsRef<str>, tag: impl AsRef<str>) -> Self {
        // Language tags compare case-insensitively; keep them lower-cased.
        Self {
            lexical: Arc::from(lexical.as_ref()),
            kind: LiteralKind::Lang(Arc::from(tag.as_ref().to_lowercase().as_str())),
        }
    }

    pub fn language(&self) -> Option<&str> {
        match &self.kind {
            LiteralKind::Lang(tag) => Some(tag),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", escape(&self.lexical))?;
        match &self.kind {
            LiteralKind::Plain => Ok(()),
            LiteralKind::Typed(dt) => write!(f, "^^{dt}"),
            LiteralKind::Lang(tag) => write!(f, "@{tag}"),
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

// ───────────────────────────────────────── value ─────────────

/// Anything that may appear in object position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Resource(Resource),
    Literal(Literal),
}

impl Value {
    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Value::Resource(r) => Some(r),
            Value::Literal(_) => None,
        }
    }
}

impl From<Resource> for Value {
    fn from(r: Resource) -> Self {
        Value::Resource(r)
    }
}

impl From<Literal> for Value {
    fn from(l: Literal) -> Self {
        Value::Literal(l)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Resource(r) => r.fmt(f),
            Value::Literal(l) => l.fmt(f),
        }
    }
}

// ───────────────────────────────────────── vocabulary ────────

/// Well-known IRIs used by the tree projection and its host.
pub mod vocab {
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

    /// Prefix of the container membership properties `rdf:_1`, `rdf:_2`, …
    pub const RDF_MEMBER_PREFIX: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#_";

    /// Position encoded in a container membership property, if `iri` is one.
    pub fn membership_index(iri: &str) -> Option<u32> {
        let n = iri.strip_prefix(RDF_MEMBER_PREFIX)?;
        if n.starts_with('0') {
            return None;
        }
        n.parse().ok().filter(|&n| n > 0)
    }
}
