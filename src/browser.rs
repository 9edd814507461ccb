//! Schema browser tree
//!
//! Walks the registry and the catalog accessors to build the navigation
//! hierarchy: connection → schema → {tables, views, materialized views,
//! indexes, functions, triggers} → columns. Pure presentation glue — no
//! query logic of its own, and no
//! widgets: the result is a plain tagged tree any frontend can render.
//!
//! Failure tolerances mirror the detail they feed: an unreadable row count
//! renders as 0, unreadable columns as a childless table, an unlistable
//! object group as an empty group. Only a failed schema listing empties the
//! whole connection node.

use crate::db::catalog::Catalog;
use crate::db::provider::Database;
use crate::registry::ConnectionRegistry;

/// What a tree node represents, with the fields that kind needs
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Connection,
    Schema,
    /// Heading node grouping one kind of object under a schema
    Group(ObjectGroup),
    Table { row_count: i64 },
    View,
    MaterializedView,
    Index,
    Function,
    Trigger,
    Column { data_type: String, nullable: bool },
}

/// Object-kind headings under a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectGroup {
    Tables,
    Views,
    MaterializedViews,
    Indexes,
    Functions,
    Triggers,
}

impl ObjectGroup {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectGroup::Tables => "Tables",
            ObjectGroup::Views => "Views",
            ObjectGroup::MaterializedViews => "Materialized Views",
            ObjectGroup::Indexes => "Indexes",
            ObjectGroup::Functions => "Functions",
            ObjectGroup::Triggers => "Triggers",
        }
    }
}

/// One node of the browser tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Object name (for groups, the heading label)
    pub name: String,
    pub kind: NodeKind,
    /// Display name of the owning connection, the back-reference used for
    /// on-demand detail queries
    pub connection: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(name: impl Into<String>, kind: NodeKind, connection: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            connection: connection.to_string(),
            children: Vec::new(),
        }
    }

    /// One display line for this node
    fn label(&self) -> String {
        match &self.kind {
            NodeKind::Connection => self.name.clone(),
            NodeKind::Schema => self.name.clone(),
            NodeKind::Group(group) => format!("{} ({})", group.label(), self.children.len()),
            NodeKind::Table { row_count } => format!("{} ({} rows)", self.name, row_count),
            NodeKind::View
            | NodeKind::MaterializedView
            | NodeKind::Index
            | NodeKind::Function
            | NodeKind::Trigger => self.name.clone(),
            NodeKind::Column {
                data_type,
                nullable,
            } => {
                let marker = if *nullable { "null" } else { "not null" };
                format!("{}: {} {}", self.name, data_type, marker)
            }
        }
    }

    /// Indented plain-text rendering of this subtree
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into(0, &mut lines);
        lines
    }

    fn render_into(&self, depth: usize, lines: &mut Vec<String>) {
        lines.push(format!("{}{}", "  ".repeat(depth), self.label()));
        for child in &self.children {
            child.render_into(depth + 1, lines);
        }
    }
}

/// Build the full browser tree, one root node per registry entry.
///
/// Each expansion issues its catalog queries afresh; there is no cache to
/// invalidate, so a rebuild always reflects the live catalog.
pub async fn build_tree<D: Database>(registry: &ConnectionRegistry<D>) -> Vec<TreeNode> {
    let mut roots = Vec::new();
    for (name, db) in registry.iter() {
        roots.push(build_connection_node(name, db).await);
    }
    roots
}

async fn build_connection_node<D: Database>(name: &str, db: &D) -> TreeNode {
    let mut node = TreeNode::new(name, NodeKind::Connection, name);

    let schemas = match db.schemas().await {
        Ok(schemas) => schemas,
        Err(e) => {
            tracing::warn!(connection = %name, error = %e, "could not list schemas");
            return node;
        }
    };

    for schema in schemas {
        node.children.push(build_schema_node(name, db, &schema).await);
    }
    node
}

async fn build_schema_node<D: Database>(connection: &str, db: &D, schema: &str) -> TreeNode {
    let mut node = TreeNode::new(schema, NodeKind::Schema, connection);

    let mut tables_group = TreeNode::new(
        ObjectGroup::Tables.label(),
        NodeKind::Group(ObjectGroup::Tables),
        connection,
    );
    for table in db.tables(schema).await.unwrap_or_default() {
        tables_group
            .children
            .push(build_table_node(connection, db, schema, &table).await);
    }
    node.children.push(tables_group);

    node.children.push(listing_group(
        connection,
        ObjectGroup::Views,
        NodeKind::View,
        db.views(schema).await.unwrap_or_default(),
    ));
    node.children.push(listing_group(
        connection,
        ObjectGroup::MaterializedViews,
        NodeKind::MaterializedView,
        db.materialized_views(schema).await.unwrap_or_default(),
    ));
    node.children.push(listing_group(
        connection,
        ObjectGroup::Indexes,
        NodeKind::Index,
        db.indexes(schema).await.unwrap_or_default(),
    ));
    node.children.push(listing_group(
        connection,
        ObjectGroup::Functions,
        NodeKind::Function,
        db.functions(schema).await.unwrap_or_default(),
    ));
    node.children.push(listing_group(
        connection,
        ObjectGroup::Triggers,
        NodeKind::Trigger,
        db.triggers(schema).await.unwrap_or_default(),
    ));

    node
}

async fn build_table_node<D: Database>(
    connection: &str,
    db: &D,
    schema: &str,
    table: &str,
) -> TreeNode {
    let row_count = db.table_row_count(schema, table).await.unwrap_or(0);
    let mut node = TreeNode::new(table, NodeKind::Table { row_count }, connection);

    for column in db.table_columns(schema, table).await.unwrap_or_default() {
        node.children.push(TreeNode::new(
            column.name,
            NodeKind::Column {
                data_type: column.data_type,
                nullable: column.nullable,
            },
            connection,
        ));
    }
    node
}

fn listing_group(
    connection: &str,
    group: ObjectGroup,
    kind: NodeKind,
    names: Vec<String>,
) -> TreeNode {
    let mut node = TreeNode::new(group.label(), NodeKind::Group(group), connection);
    for name in names {
        node.children.push(TreeNode::new(name, kind.clone(), connection));
    }
    node
}
