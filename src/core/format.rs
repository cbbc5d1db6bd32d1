//! Turning store values into cell text.

use super::term::{vocab, Literal, LiteralKind, Resource, Value};

/// How the values of one cell are rendered and joined.
#[derive(Debug, Clone)]
pub struct CellFormat {
    /// Placed between multiple values of the same predicate.
    pub separator: String,
    /// `(prefix, namespace)` pairs used to compact IRIs, e.g. `rdf:type`.
    pub prefixes: Vec<(String, String)>,
    /// Append `@tag` to language-tagged literals.
    pub show_language: bool,
}

impl Default for CellFormat {
    fn default() -> Self {
        Self {
            separator: ", ".to_string(),
            prefixes: vec![
                ("rdf".to_string(), vocab::RDF.to_string()),
                ("rdfs".to_string(), vocab::RDFS.to_string()),
                ("xsd".to_string(), vocab::XSD.to_string()),
            ],
            show_language: false,
        }
    }
}

impl CellFormat {
    /// Register a namespace prefix, replacing any previous binding of `prefix`.
    pub fn bind_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        match self.prefixes.iter_mut().find(|(p, _)| *p == prefix) {
            Some(slot) => slot.1 = namespace,
            None => self.prefixes.push((prefix, namespace)),
        }
    }

    /// Expand a user-typed name into a full IRI: `<iri>` loses its brackets,
    /// `prefix:local` is expanded when `prefix` is bound, anything else is
    /// returned unchanged.
    pub fn expand(&self, name: &str) -> String {
        let name = name.trim();
        if let Some(iri) = name.strip_prefix('<').and_then(|n| n.strip_suffix('>')) {
            return iri.to_string();
        }
        if let Some((prefix, local)) = name.split_once(':') {
            if let Some((_, ns)) = self.prefixes.iter().find(|(p, _)| p == prefix) {
                return format!("{ns}{local}");
            }
        }
        name.to_string()
    }

    /// Render a resource: compacted IRI when a prefix matches (longest
    /// namespace wins), the bare IRI otherwise, `_:label` for blank nodes.
    pub fn resource(&self, resource: &Resource) -> String {
        match resource {
            Resource::Blank(label) => format!("_:{label}"),
            Resource::Iri(iri) => self
                .prefixes
                .iter()
                .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns.as_str()))
                .max_by_key(|(_, ns)| ns.len())
                .map(|(prefix, ns)| format!("{prefix}:{}", &iri[ns.len()..]))
                .unwrap_or_else(|| iri.to_string()),
        }
    }

    pub fn literal(&self, literal: &Literal) -> String {
        match &literal.kind {
            LiteralKind::Lang(tag) if self.show_language => {
                format!("{}@{tag}", literal.lexical)
            }
            _ => literal.lexical.to_string(),
        }
    }

    pub fn value(&self, value: &Value) -> String {
        match value {
            Value::Resource(r) => self.resource(r),
            Value::Literal(l) => self.literal(l),
        }
    }

    /// Join every value in the order given.  No values → empty string.
    pub fn join(&self, values: &[Value]) -> String {
        values
            .iter()
            .map(|v| self.value(v))
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compacts_with_longest_namespace() {
        let mut fmt = CellFormat::default();
        fmt.bind_prefix("ex", "http://example.org/");
        fmt.bind_prefix("exv", "http://example.org/vocab#");

        assert_eq!(fmt.resource(&Resource::iri(vocab::RDF_TYPE)), "rdf:type");
        assert_eq!(
            fmt.resource(&Resource::iri("http://example.org/vocab#Thing")),
            "exv:Thing"
        );
        assert_eq!(fmt.resource(&Resource::iri("urn:x:1")), "urn:x:1");
        assert_eq!(fmt.resource(&Resource::blank("b0")), "_:b0");
    }

    #[test]
    fn expands_prefixed_names() {
        let mut fmt = CellFormat::default();
        fmt.bind_prefix("ex", "http://example.org/");
        assert_eq!(fmt.expand("ex:zoo"), "http://example.org/zoo");
        assert_eq!(fmt.expand("rdfs:label"), vocab::RDFS_LABEL);
        assert_eq!(fmt.expand("<urn:a:b>"), "urn:a:b");
        assert_eq!(fmt.expand("http://x.org/y"), "http://x.org/y");
    }

    #[test]
    fn joins_in_given_order() {
        let fmt = CellFormat::default();
        let values = vec![
            Value::Literal(Literal::plain("b")),
            Value::Literal(Literal::lang("a", "EN")),
        ];
        assert_eq!(fmt.join(&values), "b, a");
        assert_eq!(fmt.join(&[]), "");
    }

    #[test]
    fn language_suffix_is_optional() {
        let fmt = CellFormat {
            show_language: true,
            ..CellFormat::default()
        };
        assert_eq!(fmt.literal(&Literal::lang("chat", "FR")), "chat@fr");
    }
}
