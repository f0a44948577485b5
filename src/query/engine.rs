//! Query engine seam
//!
//! The projection core treats query execution as a black box: it opens a read
//! transaction, hands it a [`GraphQuery`] and pulls rows from the returned
//! stream one at a time. The transaction is held for as long as the stream
//! lives and is released when the stream is dropped, whether or not it was
//! consumed to the end.

use super::row::Row;
use crate::graph::{NodeId, PropertyValue};
use indexmap::IndexMap;
use thiserror::Error;

/// Query errors
#[derive(Error, Debug)]
pub enum QueryError {
    /// Query text could not be understood
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Valid query outside what the engine supports
    #[error("Unsupported query: {0}")]
    Unsupported(String),

    /// A `$param` referenced by the query was not supplied
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Transaction could not be started or was aborted
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Failure while producing rows
    #[error("Execution error: {0}")]
    Execution(String),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Query parameters
pub type Params = IndexMap<String, PropertyValue>;

/// A finite, forward-only, non-restartable sequence of rows
pub type RowStream = Box<dyn Iterator<Item = QueryResult<Row>> + Send>;

/// Entity addressed by a describe request
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSelector {
    /// Engine-assigned numeric id
    ById(NodeId),
    /// Value of the `uri` property of a `Resource` node
    ByUri(String),
}

/// Column names of a describe result
pub const DESCRIBE_NODE_COLUMN: &str = "x";
pub const DESCRIBE_REL_COLUMN: &str = "r";
pub const DESCRIBE_VALUE_COLUMN: &str = "value";

/// Node id as a Cypher integer; ids above `i64::MAX` have no such form
pub fn cypher_id(id: NodeId) -> QueryResult<i64> {
    i64::try_from(id.as_u64())
        .map_err(|_| QueryError::Execution(format!("Node id {} does not fit a Cypher integer", id)))
}

/// A request for rows
#[derive(Debug, Clone, PartialEq)]
pub enum GraphQuery {
    /// Free-form Cypher text
    Cypher { text: String, params: Params },
    /// One node plus, optionally, every relationship touching it.
    ///
    /// Rows carry columns `x` (the node), `r` (a relationship or null) and
    /// `value` (the neighbour's id or uri, or null).
    Describe { selector: NodeSelector, with_context: bool },
}

impl GraphQuery {
    /// Free-form query without parameters
    pub fn cypher(text: impl Into<String>) -> Self {
        GraphQuery::Cypher {
            text: text.into(),
            params: Params::new(),
        }
    }

    pub fn describe_by_id(id: impl Into<NodeId>, with_context: bool) -> Self {
        GraphQuery::Describe {
            selector: NodeSelector::ById(id.into()),
            with_context,
        }
    }

    pub fn describe_by_uri(uri: impl Into<String>, with_context: bool) -> Self {
        GraphQuery::Describe {
            selector: NodeSelector::ByUri(uri.into()),
            with_context,
        }
    }

    /// Render as Cypher, for engines that only accept query text
    pub fn to_cypher(&self) -> QueryResult<(String, Params)> {
        match self {
            GraphQuery::Cypher { text, params } => Ok((text.clone(), params.clone())),
            GraphQuery::Describe { selector, with_context } => {
                let mut params = Params::new();
                let text = match (selector, with_context) {
                    (NodeSelector::ById(id), true) => {
                        params.insert("theid".to_string(), PropertyValue::Int64(cypher_id(*id)?));
                        "MATCH (x) WHERE ID(x) = $theid \
                         OPTIONAL MATCH (x)-[r]-(val) \
                         RETURN x, r, ID(val) AS value"
                    }
                    (NodeSelector::ById(id), false) => {
                        params.insert("theid".to_string(), PropertyValue::Int64(cypher_id(*id)?));
                        "MATCH (x) WHERE ID(x) = $theid \
                         RETURN x, NULL AS r, NULL AS value"
                    }
                    (NodeSelector::ByUri(uri), true) => {
                        params.insert("theuri".to_string(), PropertyValue::String(uri.clone()));
                        "MATCH (x:Resource {uri: $theuri}) \
                         OPTIONAL MATCH (x)-[r]-(val:Resource) WHERE exists(val.uri) \
                         RETURN x, r, val.uri AS value"
                    }
                    (NodeSelector::ByUri(uri), false) => {
                        params.insert("theuri".to_string(), PropertyValue::String(uri.clone()));
                        "MATCH (x:Resource {uri: $theuri}) \
                         RETURN x, NULL AS r, NULL AS value"
                    }
                };
                Ok((text.to_string(), params))
            }
        }
    }
}

/// A read transaction; rows it produces stay valid while it is alive
pub trait ReadTransaction: Send {
    /// Start executing `query`, returning a lazy row stream
    fn execute(&self, query: &GraphQuery) -> QueryResult<RowStream>;
}

/// Entry point of a query engine
pub trait QueryEngine: Send + Sync {
    /// Begin a read transaction
    fn begin_read(&self) -> QueryResult<Box<dyn ReadTransaction>>;
}

/// Rows of one query together with the transaction that produced them.
///
/// Field order matters: the row stream is dropped before the transaction.
pub struct ResultStream {
    rows: RowStream,
    _tx: Box<dyn ReadTransaction>,
}

impl ResultStream {
    /// Begin a read transaction on `engine` and start executing `query`
    pub fn open(engine: &dyn QueryEngine, query: &GraphQuery) -> QueryResult<Self> {
        let tx = engine.begin_read()?;
        let rows = tx.execute(query)?;
        Ok(Self { rows, _tx: tx })
    }
}

impl Iterator for ResultStream {
    type Item = QueryResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_by_id_as_cypher() {
        let (text, params) = GraphQuery::describe_by_id(5, true).to_cypher().unwrap();
        assert!(text.contains("ID(x) = $theid"));
        assert!(text.contains("OPTIONAL MATCH"));
        assert_eq!(params.get("theid"), Some(&PropertyValue::Int64(5)));

        let (text, _) = GraphQuery::describe_by_id(5, false).to_cypher().unwrap();
        assert!(text.contains("NULL AS r"));
        assert!(!text.contains("OPTIONAL MATCH"));
    }

    #[test]
    fn test_describe_by_uri_as_cypher() {
        let (text, params) = GraphQuery::describe_by_uri("http://ex.org/a", true).to_cypher().unwrap();
        assert!(text.contains("x:Resource {uri: $theuri}"));
        assert_eq!(
            params.get("theuri"),
            Some(&PropertyValue::String("http://ex.org/a".to_string()))
        );
    }

    #[test]
    fn test_cypher_passthrough() {
        let query = GraphQuery::cypher("MATCH (n) RETURN n");
        let (text, params) = query.to_cypher().unwrap();
        assert_eq!(text, "MATCH (n) RETURN n");
        assert!(params.is_empty());
    }

    #[test]
    fn test_describe_id_beyond_cypher_integers() {
        let query = GraphQuery::describe_by_id(u64::MAX, true);
        assert!(matches!(query.to_cypher(), Err(QueryError::Execution(_))));
        assert_eq!(cypher_id(NodeId::new(i64::MAX as u64)).unwrap(), i64::MAX);
    }
}
