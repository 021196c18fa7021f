//! An in-memory attributed multigraph.

use std::collections::HashMap;

use crate::{
    access::{
        AttributeId, AttributeKind, Direction, ElementType, GraphRead, GraphWrite, LinkId,
        TransactionId, TransactionType, VertexId,
    },
    error::{Error, Result},
    link::LinkKey,
    metrics,
};

#[derive(Clone, Debug)]
struct TransactionRecord {
    source: VertexId,
    destination: VertexId,
    directed: bool,
    link: LinkId,
    kind: Option<TransactionType>,
}

#[derive(Clone, Debug)]
struct LinkRecord {
    key: LinkKey<VertexId>,
    /// Position of the link in `link_order`.
    position: usize,
    transactions: Vec<TransactionId>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum AttributeValue {
    Float(f32),
    Double(f64),
}

#[derive(Clone, Debug)]
struct AttributeColumn {
    element: ElementType,
    kind: AttributeKind,
    name: String,
    values: HashMap<usize, AttributeValue>,
}

/// A graph of vertices joined by links, each link grouping one or more transactions.
///
/// Vertex, link and transaction ids are never reused. Vertex and link positions stay dense:
/// removing an element moves the last one into its slot.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    /// Vertex ids by position.
    vertices: Vec<VertexId>,
    /// Vertex positions by id.
    positions: HashMap<VertexId, usize>,
    /// Distinct neighbours of each vertex, in the order the links were created.
    neighbours: HashMap<VertexId, Vec<VertexId>>,
    next_vertex_id: VertexId,
    links: HashMap<LinkId, LinkRecord>,
    /// Link ids by position.
    link_order: Vec<LinkId>,
    link_index: HashMap<LinkKey<VertexId>, LinkId>,
    next_link_id: LinkId,
    transactions: HashMap<TransactionId, TransactionRecord>,
    next_transaction_id: TransactionId,
    attributes: Vec<AttributeColumn>,
}

impl Graph {
    /// Creates an empty graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use plexus::access::GraphRead;
    /// use plexus::graph::Graph;
    ///
    /// let graph = Graph::new();
    /// assert_eq!(graph.vertex_count(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph with `n` unconnected vertices, with ids `0..n`.
    pub fn with_vertices(n: usize) -> Self {
        let mut graph = Self::new();
        for _ in 0..n {
            graph.add_vertex();
        }
        graph
    }

    /// Adds a vertex and returns its id.
    pub fn add_vertex(&mut self) -> VertexId {
        let id = self.next_vertex_id;
        self.next_vertex_id += 1;

        self.positions.insert(id, self.vertices.len());
        self.vertices.push(id);
        self.neighbours.insert(id, Vec::new());

        id
    }

    /// Adds a transaction between two existing vertices, creating their link if needed.
    ///
    /// # Panics
    ///
    /// Panics if either vertex doesn't exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use plexus::access::{Direction, GraphRead};
    /// use plexus::graph::Graph;
    ///
    /// let mut graph = Graph::with_vertices(2);
    /// let uphill = graph.add_transaction(0, 1, true, None);
    /// let downhill = graph.add_transaction(1, 0, true, None);
    ///
    /// assert_eq!(graph.link_count(), 1);
    /// assert_eq!(graph.transaction_direction(uphill), Direction::Uphill);
    /// assert_eq!(graph.transaction_direction(downhill), Direction::Downhill);
    /// ```
    pub fn add_transaction(
        &mut self,
        source: VertexId,
        destination: VertexId,
        directed: bool,
        kind: Option<TransactionType>,
    ) -> TransactionId {
        assert!(
            self.contains_vertex(source) && self.contains_vertex(destination),
            "transaction endpoints {source} -> {destination} must exist"
        );

        let key = LinkKey::new(source, destination);
        let link = match self.link_index.get(&key) {
            Some(link) => *link,
            None => self.insert_link(key),
        };

        let id = self.next_transaction_id;
        self.next_transaction_id += 1;

        self.transactions.insert(
            id,
            TransactionRecord {
                source,
                destination,
                directed,
                link,
                kind,
            },
        );
        // Safety: the link either existed or was inserted above.
        self.links.get_mut(&link).unwrap().transactions.push(id);

        id
    }

    /// Removes a transaction and returns whether it was present. A link losing its last
    /// transaction is removed with it.
    pub fn remove_transaction(&mut self, transaction: TransactionId) -> bool {
        let Some(record) = self.transactions.remove(&transaction) else {
            return false;
        };
        self.remove_values(ElementType::Transaction, transaction);

        // Safety: a stored transaction always references a stored link.
        let link = self.links.get_mut(&record.link).unwrap();
        link.transactions.retain(|t| *t != transaction);

        if link.transactions.is_empty() {
            self.remove_link(record.link);
        }

        true
    }

    /// Removes a vertex with every transaction touching it and returns whether it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use plexus::access::GraphRead;
    /// use plexus::graph::Graph;
    ///
    /// let mut graph = Graph::with_vertices(3);
    /// graph.add_transaction(0, 1, false, None);
    ///
    /// assert_eq!(graph.remove_vertex(0), true);
    /// assert_eq!(graph.remove_vertex(0), false);
    /// assert_eq!(graph.link_count(), 0);
    /// // The last vertex took the freed position.
    /// assert_eq!(graph.vertex(0), 2);
    /// ```
    pub fn remove_vertex(&mut self, vertex: VertexId) -> bool {
        if !self.contains_vertex(vertex) {
            return false;
        }

        // Safety: checked above.
        let links: Vec<LinkId> = self.neighbours[&vertex]
            .iter()
            .map(|neighbour| self.link_index[&LinkKey::new(vertex, *neighbour)])
            .collect();

        for link in links {
            // Safety: collected from the live index.
            let transactions = self.links[&link].transactions.clone();
            for transaction in transactions {
                self.remove_transaction(transaction);
            }
        }

        // Safety: checked above.
        let position = self.positions.remove(&vertex).unwrap();
        self.vertices.swap_remove(position);
        if let Some(moved) = self.vertices.get(position) {
            self.positions.insert(*moved, position);
        }
        self.neighbours.remove(&vertex);
        self.remove_values(ElementType::Vertex, vertex);

        true
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.positions.contains_key(&vertex)
    }

    /// Checks if the two vertices are joined by a link.
    pub fn contains_link(&self, a: VertexId, b: VertexId) -> bool {
        self.link_index.contains_key(&LinkKey::new(a, b))
    }

    /// Returns the transaction count of the graph.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Computes the density of the graph, the ratio of non-loop links with respect to the
    /// maximum possible links.
    ///
    /// # Examples
    ///
    /// ```
    /// use plexus::graph::Graph;
    ///
    /// let mut graph = Graph::with_vertices(3);
    /// assert_eq!(graph.density(), 0.0);
    ///
    /// graph.add_transaction(0, 1, false, None);
    /// graph.add_transaction(0, 2, false, None);
    /// assert_eq!(graph.density(), 2.0 / 3.0);
    /// ```
    pub fn density(&self) -> f32 {
        metrics::density(self)
    }

    //
    // Private
    //

    fn insert_link(&mut self, key: LinkKey<VertexId>) -> LinkId {
        let id = self.next_link_id;
        self.next_link_id += 1;

        let (low, high) = (*key.low(), *key.high());
        // Safety: the endpoints were checked by the caller.
        self.neighbours.get_mut(&low).unwrap().push(high);
        if !key.is_loop() {
            self.neighbours.get_mut(&high).unwrap().push(low);
        }

        self.links.insert(
            id,
            LinkRecord {
                key,
                position: self.link_order.len(),
                transactions: Vec::new(),
            },
        );
        self.link_order.push(id);
        self.link_index.insert(key, id);

        id
    }

    fn remove_link(&mut self, link: LinkId) {
        // Safety: only called for stored links.
        let record = self.links.remove(&link).unwrap();
        self.link_index.remove(&record.key);

        self.link_order.swap_remove(record.position);
        if let Some(moved) = self.link_order.get(record.position) {
            // Safety: ids in `link_order` are stored links.
            self.links.get_mut(moved).unwrap().position = record.position;
        }

        let (low, high) = (*record.key.low(), *record.key.high());
        if let Some(neighbours) = self.neighbours.get_mut(&low) {
            neighbours.retain(|n| *n != high);
        }
        if let Some(neighbours) = self.neighbours.get_mut(&high) {
            neighbours.retain(|n| *n != low);
        }
        self.remove_values(ElementType::Link, link);
    }

    /// Drops stored attribute values for an element that no longer exists.
    fn remove_values(&mut self, element: ElementType, id: usize) {
        for column in self.attributes.iter_mut().filter(|c| c.element == element) {
            column.values.remove(&id);
        }
    }

    fn column(&self, attribute: AttributeId) -> Option<&AttributeColumn> {
        self.attributes.get(attribute)
    }

    fn set_value(
        &mut self,
        attribute: AttributeId,
        element: usize,
        value: AttributeValue,
    ) -> Result<()> {
        let column = self
            .attributes
            .get_mut(attribute)
            .ok_or(Error::UnknownAttribute(attribute))?;

        let kind = match value {
            AttributeValue::Float(_) => AttributeKind::Float,
            AttributeValue::Double(_) => AttributeKind::Double,
        };
        if column.kind != kind {
            return Err(Error::AttributeKindMismatch {
                element: column.element,
                name: column.name.clone(),
                expected: column.kind,
                found: kind,
            });
        }

        column.values.insert(element, value);
        Ok(())
    }

    fn record(&self, transaction: TransactionId) -> &TransactionRecord {
        self.transactions
            .get(&transaction)
            .unwrap_or_else(|| panic!("unknown transaction {transaction}"))
    }

    fn link_record(&self, link: LinkId) -> &LinkRecord {
        self.links
            .get(&link)
            .unwrap_or_else(|| panic!("unknown link {link}"))
    }

    fn neighbour_list(&self, vertex: VertexId) -> &[VertexId] {
        self.neighbours
            .get(&vertex)
            .unwrap_or_else(|| panic!("unknown vertex {vertex}"))
    }
}

impl GraphRead for Graph {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn vertex(&self, position: usize) -> VertexId {
        self.vertices[position]
    }

    fn vertex_position(&self, vertex: VertexId) -> usize {
        *self
            .positions
            .get(&vertex)
            .unwrap_or_else(|| panic!("unknown vertex {vertex}"))
    }

    fn neighbour_count(&self, vertex: VertexId) -> usize {
        self.neighbour_list(vertex).len()
    }

    fn neighbour(&self, vertex: VertexId, k: usize) -> VertexId {
        self.neighbour_list(vertex)[k]
    }

    fn link_between(&self, a: VertexId, b: VertexId) -> Option<LinkId> {
        self.link_index.get(&LinkKey::new(a, b)).copied()
    }

    fn link_count(&self) -> usize {
        self.link_order.len()
    }

    fn link(&self, position: usize) -> LinkId {
        self.link_order[position]
    }

    fn link_low_vertex(&self, link: LinkId) -> VertexId {
        *self.link_record(link).key.low()
    }

    fn link_high_vertex(&self, link: LinkId) -> VertexId {
        *self.link_record(link).key.high()
    }

    fn link_transaction_count(&self, link: LinkId) -> usize {
        self.link_record(link).transactions.len()
    }

    fn link_transaction(&self, link: LinkId, k: usize) -> TransactionId {
        self.link_record(link).transactions[k]
    }

    fn transaction_direction(&self, transaction: TransactionId) -> Direction {
        let record = self.record(transaction);
        if !record.directed {
            Direction::Flat
        } else if record.source <= record.destination {
            Direction::Uphill
        } else {
            Direction::Downhill
        }
    }

    fn transaction_source_vertex(&self, transaction: TransactionId) -> VertexId {
        self.record(transaction).source
    }

    fn transaction_destination_vertex(&self, transaction: TransactionId) -> VertexId {
        self.record(transaction).destination
    }

    fn transaction_type(&self, transaction: TransactionId) -> Option<&TransactionType> {
        self.record(transaction).kind.as_ref()
    }

    fn attribute(&self, element: ElementType, name: &str) -> Option<AttributeId> {
        self.attributes
            .iter()
            .position(|column| column.element == element && column.name == name)
    }

    fn float_value(&self, attribute: AttributeId, element: usize) -> Option<f32> {
        match self.column(attribute)?.values.get(&element)? {
            AttributeValue::Float(value) => Some(*value),
            AttributeValue::Double(_) => None,
        }
    }

    fn double_value(&self, attribute: AttributeId, element: usize) -> Option<f64> {
        match self.column(attribute)?.values.get(&element)? {
            AttributeValue::Double(value) => Some(*value),
            AttributeValue::Float(_) => None,
        }
    }
}

impl GraphWrite for Graph {
    fn ensure_attribute(
        &mut self,
        element: ElementType,
        kind: AttributeKind,
        name: &str,
    ) -> Result<AttributeId> {
        if let Some(attribute) = self.attribute(element, name) {
            let column = &self.attributes[attribute];
            if column.kind != kind {
                return Err(Error::AttributeKindMismatch {
                    element,
                    name: name.to_owned(),
                    expected: kind,
                    found: column.kind,
                });
            }
            return Ok(attribute);
        }

        self.attributes.push(AttributeColumn {
            element,
            kind,
            name: name.to_owned(),
            values: HashMap::new(),
        });

        Ok(self.attributes.len() - 1)
    }

    fn set_float(&mut self, attribute: AttributeId, element: usize, value: f32) -> Result<()> {
        self.set_value(attribute, element, AttributeValue::Float(value))
    }

    fn set_double(&mut self, attribute: AttributeId, element: usize, value: f64) -> Result<()> {
        self.set_value(attribute, element, AttributeValue::Double(value))
    }
}
