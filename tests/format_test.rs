use quick_xml::events::Event;
use quick_xml::Reader;
use rio_api::parser::{QuadsParser, TriplesParser};
use rio_turtle::{TriGParser, TurtleError, TurtleParser};
use rio_xml::{RdfXmlError, RdfXmlParser};
use samyama_rdf_endpoint::graph::Node;
use samyama_rdf_endpoint::query::{Relationship, Row};
use samyama_rdf_endpoint::rdf::{
    IdentityStrategy, NamespaceMapping, PreservedUri, ProjectionError, ProjectionSettings,
    RdfFormat, RdfSerializer, RequestContext, SyntheticId, TripleProjector,
};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use std::sync::Arc;

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const XSD_LONG: &str = "http://www.w3.org/2001/XMLSchema#long";

fn project(
    format: RdfFormat,
    strategy: &dyn IdentityStrategy,
    namespaces: NamespaceMapping,
    rows: Vec<Row>,
) -> Result<Vec<u8>, ProjectionError> {
    let ctx = RequestContext::new(Arc::new(ProjectionSettings::default()), namespaces);
    let prefixes = strategy.declared_prefixes(&ctx);
    let mut serializer = RdfSerializer::open(format, Vec::new(), &prefixes)?;
    TripleProjector::new(strategy, ctx).project(rows.into_iter().map(Ok), &mut serializer)?;
    Ok(serializer.close()?)
}

/// Parse `output` back into sorted N-Triples-like lines (no final dot)
fn parse(format: RdfFormat, output: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    match format {
        RdfFormat::NTriples | RdfFormat::Turtle | RdfFormat::N3 => {
            TurtleParser::new(output, None)
                .parse_all(&mut |t| {
                    lines.push(t.to_string());
                    Ok(()) as Result<(), TurtleError>
                })
                .unwrap();
        }
        RdfFormat::TriG => {
            TriGParser::new(output, None)
                .parse_all(&mut |q| {
                    assert!(q.graph_name.is_none());
                    lines.push(q.to_string());
                    Ok(()) as Result<(), TurtleError>
                })
                .unwrap();
        }
        RdfFormat::RdfXml => {
            RdfXmlParser::new(output, None)
                .parse_all(&mut |t| {
                    lines.push(t.to_string());
                    Ok(()) as Result<(), RdfXmlError>
                })
                .unwrap();
        }
        RdfFormat::JsonLd => lines = json_ld_lines(output),
        RdfFormat::TriX => lines = trix_lines(output),
    }
    lines.sort();
    lines
}

fn json_term(value: &JsonValue) -> String {
    if let Some(id) = value["@id"].as_str() {
        return node_term(id);
    }
    let lexical = value["@value"].as_str().unwrap();
    match value["@type"].as_str() {
        Some(datatype) => format!("\"{}\"^^<{}>", lexical, datatype),
        None => format!("\"{}\"", lexical),
    }
}

fn node_term(id: &str) -> String {
    if id.starts_with("_:") {
        id.to_string()
    } else {
        format!("<{}>", id)
    }
}

fn json_ld_lines(output: &[u8]) -> Vec<String> {
    let doc: JsonValue = serde_json::from_slice(output).unwrap();
    let mut lines = Vec::new();
    for node in doc["@graph"].as_array().unwrap() {
        let subject = node_term(node["@id"].as_str().unwrap());
        for (key, values) in node.as_object().unwrap() {
            match key.as_str() {
                "@id" => {}
                "@type" => {
                    for class in values.as_array().unwrap() {
                        lines.push(format!("{} <{}> <{}>", subject, RDF_TYPE, class.as_str().unwrap()));
                    }
                }
                predicate => {
                    for value in values.as_array().unwrap() {
                        lines.push(format!("{} <{}> {}", subject, predicate, json_term(value)));
                    }
                }
            }
        }
    }
    lines
}

fn trix_lines(output: &[u8]) -> Vec<String> {
    let text = std::str::from_utf8(output).unwrap();
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut lines = Vec::new();
    let mut terms: Vec<String> = Vec::new();
    let mut element = String::new();
    let mut datatype = None;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => {
                element = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                datatype = e
                    .try_get_attribute("datatype")
                    .unwrap()
                    .map(|a| a.unescape_value().unwrap().into_owned());
            }
            Event::Text(t) => {
                let value = t.unescape().unwrap().into_owned();
                terms.push(match element.as_str() {
                    "uri" => format!("<{}>", value),
                    "id" => format!("_:{}", value),
                    "plainLiteral" => format!("\"{}\"", value),
                    "typedLiteral" => format!("\"{}\"^^<{}>", value, datatype.take().unwrap()),
                    other => panic!("unexpected text in <{}>", other),
                });
            }
            Event::End(e) if e.name().as_ref() == b"triple" => {
                assert_eq!(terms.len(), 3);
                lines.push(terms.join(" "));
                terms.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }
    lines
}

/// Replace blank node labels with `_:b`, returning how many distinct labels
/// there were
fn anonymize(lines: Vec<String>) -> (Vec<String>, usize) {
    let mut labels = BTreeSet::new();
    let mut lines: Vec<String> = lines
        .into_iter()
        .map(|line| {
            line.split(' ')
                .map(|token| {
                    if token.starts_with("_:") {
                        labels.insert(token.to_string());
                        "_:b".to_string()
                    } else {
                        token.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    lines.sort();
    (lines, labels.len())
}

fn imported_rows() -> (NamespaceMapping, Vec<Row>) {
    let ann = Arc::new(
        Node::new(1)
            .with_label("Resource")
            .with_label("Person")
            .with_property("uri", "not a uri")
            .with_property("first name", "Ann"),
    );
    let bo = Arc::new(
        Node::new(2)
            .with_label("Resource")
            .with_property("uri", "http://example.org/bo")
            .with_property("ns0_name", "Bo")
            .with_property("born", 1990i64),
    );
    let knows = Relationship::new(3, "ns0_knows", ann.clone(), bo.clone());

    let mut namespaces = NamespaceMapping::new();
    namespaces.insert("ns0", "http://schema.org/");
    let rows = vec![
        Row::new().with("x", ann),
        Row::new().with("x", bo),
        Row::new().with("r", knows),
    ];
    (namespaces, rows)
}

#[test]
fn test_projection_round_trips_through_every_format() {
    let mut expected = vec![
        format!("_:b <{}> <neo4j://vocabulary#Person>", RDF_TYPE),
        "_:b <neo4j://vocabulary#first%20name> \"Ann\"".to_string(),
        "<http://example.org/bo> <http://schema.org/name> \"Bo\"".to_string(),
        format!("<http://example.org/bo> <neo4j://vocabulary#born> \"1990\"^^<{}>", XSD_LONG),
        "_:b <http://schema.org/knows> <http://example.org/bo>".to_string(),
    ];
    expected.sort();

    for format in RdfFormat::ALL {
        let (namespaces, rows) = imported_rows();
        let output = project(format, &PreservedUri, namespaces, rows).unwrap();
        let (lines, blank_nodes) = anonymize(parse(format, &output));
        assert_eq!(lines, expected, "{}", format);
        assert_eq!(blank_nodes, 1, "{}", format);
    }
}

fn numeric_key_row() -> Vec<Row> {
    vec![Row::new().with(
        "n",
        Node::new(1).with_label("Person").with_property("2020", 1i64),
    )]
}

#[test]
fn test_numeric_property_keys_outside_rdf_xml() {
    let mut expected = vec![
        format!("<neo4j://indiv#1> <{}> <neo4j://vocabulary#Person>", RDF_TYPE),
        format!("<neo4j://indiv#1> <neo4j://vocabulary#2020> \"1\"^^<{}>", XSD_LONG),
    ];
    expected.sort();

    for format in RdfFormat::ALL {
        if format == RdfFormat::RdfXml {
            continue;
        }
        let output = project(format, &SyntheticId, NamespaceMapping::new(), numeric_key_row()).unwrap();
        assert_eq!(parse(format, &output), expected, "{}", format);
    }
}

#[test]
fn test_rdf_xml_rejects_predicates_without_local_name() {
    let err = project(RdfFormat::RdfXml, &SyntheticId, NamespaceMapping::new(), numeric_key_row())
        .unwrap_err();
    match err {
        ProjectionError::Serialize(e) => assert!(e.to_string().contains("neo4j://vocabulary#2020")),
        other => panic!("unexpected error: {}", other),
    }
}
