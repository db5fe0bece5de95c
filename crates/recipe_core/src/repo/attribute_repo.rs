//! Tag/ingredient repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - List, rename and delete one user's tags or ingredients.
//! - Provide the scoped get-or-create primitive used by recipe writes.
//!
//! # Invariants
//! - Every statement filters on `user_id`; names are matched exactly.
//! - Lists are ordered by `name DESC, id DESC` and contain no duplicates.

use crate::model::attribute::{Attribute, AttributeId, AttributeKind};
use crate::model::recipe::RecipeId;
use crate::model::user::UserId;
use crate::repo::{ensure_tables, map_unique_violation, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Query options for tag/ingredient list use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeListQuery {
    pub kind: AttributeKind,
    pub user_id: UserId,
    /// Only return rows linked to at least one recipe.
    pub assigned_only: bool,
}

/// Repository interface for tag and ingredient operations.
pub trait AttributeRepository {
    fn list_attributes(&self, query: &AttributeListQuery) -> RepoResult<Vec<Attribute>>;
    fn get_attribute(
        &self,
        kind: AttributeKind,
        user_id: UserId,
        id: AttributeId,
    ) -> RepoResult<Option<Attribute>>;
    /// Renames one row; a name already used by the same user is a `Conflict`.
    fn rename_attribute(
        &self,
        kind: AttributeKind,
        user_id: UserId,
        id: AttributeId,
        name: &str,
    ) -> RepoResult<()>;
    /// Deletes one row and its recipe links.
    fn delete_attribute(&self, kind: AttributeKind, user_id: UserId, id: AttributeId)
        -> RepoResult<()>;
}

/// SQLite-backed tag/ingredient repository.
pub struct SqliteAttributeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttributeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(
            conn,
            &["tags", "ingredients", "recipe_tags", "recipe_ingredients"],
        )?;
        Ok(Self { conn })
    }
}

impl AttributeRepository for SqliteAttributeRepository<'_> {
    fn list_attributes(&self, query: &AttributeListQuery) -> RepoResult<Vec<Attribute>> {
        let kind = query.kind;
        let join = if query.assigned_only {
            format!(
                " INNER JOIN {link} l ON l.{column} = a.id",
                link = kind.link_table(),
                column = kind.link_column()
            )
        } else {
            String::new()
        };
        let sql = format!(
            "SELECT DISTINCT
                a.id AS id,
                a.user_id AS user_id,
                a.name AS name
             FROM {table} a{join}
             WHERE a.user_id = ?1
             ORDER BY a.name DESC, a.id DESC;",
            table = kind.table()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([query.user_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_attribute_row(row)?);
        }
        Ok(items)
    }

    fn get_attribute(
        &self,
        kind: AttributeKind,
        user_id: UserId,
        id: AttributeId,
    ) -> RepoResult<Option<Attribute>> {
        let attribute = self
            .conn
            .query_row(
                &format!(
                    "SELECT id, user_id, name FROM {} WHERE id = ?1 AND user_id = ?2;",
                    kind.table()
                ),
                params![id, user_id],
                |row| {
                    Ok(Attribute {
                        id: row.get("id")?,
                        user_id: row.get("user_id")?,
                        name: row.get("name")?,
                    })
                },
            )
            .optional()?;
        Ok(attribute)
    }

    fn rename_attribute(
        &self,
        kind: AttributeKind,
        user_id: UserId,
        id: AttributeId,
        name: &str,
    ) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE {} SET name = ?1 WHERE id = ?2 AND user_id = ?3;",
                    kind.table()
                ),
                params![name, id, user_id],
            )
            .map_err(|err| {
                map_unique_violation(err, format!("{} with this name already exists", kind.label()))
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: kind.label(),
                id,
            });
        }
        Ok(())
    }

    fn delete_attribute(
        &self,
        kind: AttributeKind,
        user_id: UserId,
        id: AttributeId,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2;", kind.table()),
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: kind.label(),
                id,
            });
        }
        Ok(())
    }
}

/// Fetches `(user_id, name)` or inserts it when absent.
///
/// Works on plain connections and on open transactions alike.
pub(crate) fn get_or_create_in(
    conn: &Connection,
    kind: AttributeKind,
    user_id: UserId,
    name: &str,
) -> RepoResult<Attribute> {
    let inserted = conn.execute(
        &format!(
            "INSERT OR IGNORE INTO {} (user_id, name) VALUES (?1, ?2);",
            kind.table()
        ),
        params![user_id, name],
    )?;
    debug!(
        "event=attribute_get_or_create module=repo kind={} created={}",
        kind.label(),
        inserted > 0
    );

    let attribute = conn.query_row(
        &format!(
            "SELECT id, user_id, name FROM {} WHERE user_id = ?1 AND name = ?2;",
            kind.table()
        ),
        params![user_id, name],
        |row| {
            Ok(Attribute {
                id: row.get("id")?,
                user_id: row.get("user_id")?,
                name: row.get("name")?,
            })
        },
    )?;
    Ok(attribute)
}

/// Links one attribute to a recipe; existing links are kept as-is.
pub(crate) fn link_in(
    conn: &Connection,
    kind: AttributeKind,
    recipe_id: RecipeId,
    attribute_id: AttributeId,
) -> RepoResult<()> {
    conn.execute(
        &format!(
            "INSERT OR IGNORE INTO {} (recipe_id, {}) VALUES (?1, ?2);",
            kind.link_table(),
            kind.link_column()
        ),
        params![recipe_id, attribute_id],
    )?;
    Ok(())
}

/// Removes every link of one kind from a recipe.
pub(crate) fn clear_links_in(
    conn: &Connection,
    kind: AttributeKind,
    recipe_id: RecipeId,
) -> RepoResult<()> {
    conn.execute(
        &format!("DELETE FROM {} WHERE recipe_id = ?1;", kind.link_table()),
        [recipe_id],
    )?;
    Ok(())
}

/// Loads the attributes linked to one recipe, ordered by name.
pub(crate) fn load_linked(
    conn: &Connection,
    kind: AttributeKind,
    recipe_id: RecipeId,
) -> RepoResult<Vec<Attribute>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT
            a.id AS id,
            a.user_id AS user_id,
            a.name AS name
         FROM {link} l
         INNER JOIN {table} a ON a.id = l.{column}
         WHERE l.recipe_id = ?1
         ORDER BY a.name ASC, a.id ASC;",
        link = kind.link_table(),
        table = kind.table(),
        column = kind.link_column()
    ))?;
    let mut rows = stmt.query([recipe_id])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_attribute_row(row)?);
    }
    Ok(items)
}

fn parse_attribute_row(row: &Row<'_>) -> RepoResult<Attribute> {
    Ok(Attribute {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
    })
}
