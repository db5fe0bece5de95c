//! Recipe repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist recipes together with their tag/ingredient link sets.
//! - Own nested writes: a recipe insert/update and every get-or-create of
//!   its attributes commit or roll back together.
//!
//! # Invariants
//! - Attributes are always resolved within the recipe owner's namespace.
//! - `update_recipe` only touches a link set when the change carries one;
//!   a present set fully replaces the previous links.
//! - Lists are ordered by `id DESC` and never repeat a recipe.

use crate::model::attribute::{AttributeInput, AttributeKind, Attribute};
use crate::model::recipe::{Price, Recipe, RecipeChanges, RecipeDraft, RecipeId};
use crate::model::user::UserId;
use crate::repo::attribute_repo::{clear_links_in, get_or_create_in, link_in, load_linked};
use crate::repo::{ensure_tables, RepoError, RepoResult};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};

const RECIPE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    description,
    time_minutes,
    price_cents,
    link,
    image
FROM recipes";

/// Query options for recipe list use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeListQuery {
    pub user_id: UserId,
    /// Keep recipes linked to any of these tags.
    pub tag_ids: Vec<i64>,
    /// Keep recipes linked to any of these ingredients.
    pub ingredient_ids: Vec<i64>,
}

impl RecipeListQuery {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            tag_ids: Vec::new(),
            ingredient_ids: Vec::new(),
        }
    }
}

/// Repository interface for recipe operations.
pub trait RecipeRepository {
    /// Inserts a recipe and links get-or-created attributes in one transaction.
    fn create_recipe(&mut self, user_id: UserId, draft: &RecipeDraft) -> RepoResult<RecipeId>;
    /// Applies a partial update, replacing link sets that are present.
    fn update_recipe(
        &mut self,
        user_id: UserId,
        recipe_id: RecipeId,
        changes: &RecipeChanges,
    ) -> RepoResult<()>;
    fn get_recipe(&self, user_id: UserId, recipe_id: RecipeId) -> RepoResult<Option<Recipe>>;
    fn list_recipes(&self, query: &RecipeListQuery) -> RepoResult<Vec<Recipe>>;
    fn delete_recipe(&self, user_id: UserId, recipe_id: RecipeId) -> RepoResult<()>;
    /// Stores a new image path and returns the previous one.
    fn set_recipe_image(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
        image: Option<&str>,
    ) -> RepoResult<Option<String>>;
    /// Fetches or inserts one of the user's tags/ingredients by exact name.
    fn get_or_create_attribute(
        &self,
        kind: AttributeKind,
        user_id: UserId,
        name: &str,
    ) -> RepoResult<Attribute>;
}

/// SQLite-backed recipe repository.
pub struct SqliteRecipeRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRecipeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(
            conn,
            &[
                "recipes",
                "tags",
                "ingredients",
                "recipe_tags",
                "recipe_ingredients",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl RecipeRepository for SqliteRecipeRepository<'_> {
    fn create_recipe(&mut self, user_id: UserId, draft: &RecipeDraft) -> RepoResult<RecipeId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO recipes (
                user_id,
                title,
                description,
                time_minutes,
                price_cents,
                link
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                user_id,
                draft.title.as_str(),
                draft.description.as_str(),
                draft.time_minutes,
                draft.price.cents(),
                draft.link.as_str(),
            ],
        )?;
        let recipe_id = tx.last_insert_rowid();

        attach_all(&tx, AttributeKind::Tag, user_id, recipe_id, &draft.tags)?;
        attach_all(
            &tx,
            AttributeKind::Ingredient,
            user_id,
            recipe_id,
            &draft.ingredients,
        )?;

        tx.commit()?;
        info!(
            "event=recipe_create module=repo status=ok recipe_id={} tags={} ingredients={}",
            recipe_id,
            draft.tags.len(),
            draft.ingredients.len()
        );
        Ok(recipe_id)
    }

    fn update_recipe(
        &mut self,
        user_id: UserId,
        recipe_id: RecipeId,
        changes: &RecipeChanges,
    ) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut recipe = load_recipe_row(&tx, user_id, recipe_id)?.ok_or(RepoError::NotFound {
            entity: "recipe",
            id: recipe_id,
        })?;

        if let Some(tags) = &changes.tags {
            clear_links_in(&tx, AttributeKind::Tag, recipe_id)?;
            attach_all(&tx, AttributeKind::Tag, user_id, recipe_id, tags)?;
        }
        if let Some(ingredients) = &changes.ingredients {
            clear_links_in(&tx, AttributeKind::Ingredient, recipe_id)?;
            attach_all(&tx, AttributeKind::Ingredient, user_id, recipe_id, ingredients)?;
        }

        changes.apply_to(&mut recipe);
        tx.execute(
            "UPDATE recipes
             SET
                title = ?1,
                description = ?2,
                time_minutes = ?3,
                price_cents = ?4,
                link = ?5
             WHERE id = ?6
               AND user_id = ?7;",
            params![
                recipe.title.as_str(),
                recipe.description.as_str(),
                recipe.time_minutes,
                recipe.price.cents(),
                recipe.link.as_str(),
                recipe_id,
                user_id,
            ],
        )?;

        tx.commit()?;
        info!(
            "event=recipe_update module=repo status=ok recipe_id={} tags_replaced={} ingredients_replaced={}",
            recipe_id,
            changes.tags.is_some(),
            changes.ingredients.is_some()
        );
        Ok(())
    }

    fn get_recipe(&self, user_id: UserId, recipe_id: RecipeId) -> RepoResult<Option<Recipe>> {
        match load_recipe_row(self.conn, user_id, recipe_id)? {
            Some(recipe) => Ok(Some(with_attributes(self.conn, recipe)?)),
            None => Ok(None),
        }
    }

    fn list_recipes(&self, query: &RecipeListQuery) -> RepoResult<Vec<Recipe>> {
        let mut sql = format!("{RECIPE_SELECT_SQL} WHERE user_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(query.user_id)];

        for (kind, ids) in [
            (AttributeKind::Tag, &query.tag_ids),
            (AttributeKind::Ingredient, &query.ingredient_ids),
        ] {
            if ids.is_empty() {
                continue;
            }
            sql.push_str(&format!(
                " AND id IN (SELECT recipe_id FROM {} WHERE {} IN ({}))",
                kind.link_table(),
                kind.link_column(),
                placeholders(ids.len())
            ));
            bind_values.extend(ids.iter().map(|id| Value::Integer(*id)));
        }
        sql.push_str(" ORDER BY id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut recipes = Vec::new();
        while let Some(row) = rows.next()? {
            let recipe = parse_recipe_row(row)?;
            recipes.push(with_attributes(self.conn, recipe)?);
        }
        Ok(recipes)
    }

    fn delete_recipe(&self, user_id: UserId, recipe_id: RecipeId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM recipes WHERE id = ?1 AND user_id = ?2;",
            params![recipe_id, user_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "recipe",
                id: recipe_id,
            });
        }
        info!("event=recipe_delete module=repo status=ok recipe_id={recipe_id}");
        Ok(())
    }

    fn set_recipe_image(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
        image: Option<&str>,
    ) -> RepoResult<Option<String>> {
        let previous: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT image FROM recipes WHERE id = ?1 AND user_id = ?2;",
                params![recipe_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(previous) = previous else {
            return Err(RepoError::NotFound {
                entity: "recipe",
                id: recipe_id,
            });
        };

        self.conn.execute(
            "UPDATE recipes SET image = ?1 WHERE id = ?2 AND user_id = ?3;",
            params![image, recipe_id, user_id],
        )?;
        Ok(previous)
    }

    fn get_or_create_attribute(
        &self,
        kind: AttributeKind,
        user_id: UserId,
        name: &str,
    ) -> RepoResult<Attribute> {
        get_or_create_in(self.conn, kind, user_id, name)
    }
}

fn attach_all(
    conn: &Connection,
    kind: AttributeKind,
    user_id: UserId,
    recipe_id: RecipeId,
    inputs: &[AttributeInput],
) -> RepoResult<()> {
    for input in inputs {
        let attribute = get_or_create_in(conn, kind, user_id, &input.name)?;
        link_in(conn, kind, recipe_id, attribute.id)?;
    }
    Ok(())
}

fn load_recipe_row(
    conn: &Connection,
    user_id: UserId,
    recipe_id: RecipeId,
) -> RepoResult<Option<Recipe>> {
    let mut stmt = conn.prepare(&format!(
        "{RECIPE_SELECT_SQL} WHERE id = ?1 AND user_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![recipe_id, user_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_recipe_row(row)?)),
        None => Ok(None),
    }
}

fn with_attributes(conn: &Connection, mut recipe: Recipe) -> RepoResult<Recipe> {
    recipe.tags = load_linked(conn, AttributeKind::Tag, recipe.id)?;
    recipe.ingredients = load_linked(conn, AttributeKind::Ingredient, recipe.id)?;
    Ok(recipe)
}

fn parse_recipe_row(row: &Row<'_>) -> RepoResult<Recipe> {
    let price_cents: i64 = row.get("price_cents")?;
    let price = Price::from_cents(price_cents).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid price value `{price_cents}` in recipes.price_cents"
        ))
    })?;

    Ok(Recipe {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        time_minutes: row.get("time_minutes")?,
        price,
        link: row.get("link")?,
        image: row.get("image")?,
        tags: Vec::new(),
        ingredients: Vec::new(),
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
