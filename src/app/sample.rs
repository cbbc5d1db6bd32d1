//! Small built-in graph, shown when no file is given.

/// A catalogue of collections; `rdfs:member` links and one `rdf:Seq`
/// form the tree, labels and types fill the columns.
pub const SAMPLE_NTRIPLES: &str = r#"
<http://example.org/catalogue> <http://www.w3.org/2000/01/rdf-schema#label> "Catalogue" .
<http://example.org/catalogue> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Catalogue> .
<http://example.org/catalogue> <http://www.w3.org/2000/01/rdf-schema#member> <http://example.org/music> .
<http://example.org/catalogue> <http://www.w3.org/2000/01/rdf-schema#member> <http://example.org/books> .
<http://example.org/music> <http://www.w3.org/2000/01/rdf-schema#label> "Music" .
<http://example.org/music> <http://www.w3.org/2000/01/rdf-schema#label> "Musique"@fr .
<http://example.org/music> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Collection> .
<http://example.org/music> <http://www.w3.org/2000/01/rdf-schema#member> <http://example.org/playlist> .
<http://example.org/music> <http://www.w3.org/2000/01/rdf-schema#member> <http://example.org/album1> .
<http://example.org/playlist> <http://www.w3.org/2000/01/rdf-schema#label> "Road trip" .
<http://example.org/playlist> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/1999/02/22-rdf-syntax-ns#Seq> .
<http://example.org/playlist> <http://www.w3.org/1999/02/22-rdf-syntax-ns#_2> <http://example.org/track2> .
<http://example.org/playlist> <http://www.w3.org/1999/02/22-rdf-syntax-ns#_1> <http://example.org/track1> .
<http://example.org/playlist> <http://www.w3.org/1999/02/22-rdf-syntax-ns#_3> _:t3 .
<http://example.org/track1> <http://www.w3.org/2000/01/rdf-schema#label> "Opening" .
<http://example.org/track2> <http://www.w3.org/2000/01/rdf-schema#label> "Interlude" .
_:t3 <http://www.w3.org/2000/01/rdf-schema#label> "Untitled" .
<http://example.org/album1> <http://www.w3.org/2000/01/rdf-schema#label> "First album" .
<http://example.org/album1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Album> .
<http://example.org/album1> <http://example.org/year> "1999"^^<http://www.w3.org/2001/XMLSchema#gYear> .
<http://example.org/books> <http://www.w3.org/2000/01/rdf-schema#label> "Books" .
<http://example.org/books> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Collection> .
<http://example.org/books> <http://www.w3.org/2000/01/rdf-schema#member> <http://example.org/novel> .
<http://example.org/books> <http://www.w3.org/2000/01/rdf-schema#member> <http://example.org/catalogue> .
<http://example.org/novel> <http://www.w3.org/2000/01/rdf-schema#label> "A novel" .
<http://example.org/novel> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Book> .
<http://example.org/novel> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Work> .
"#;
