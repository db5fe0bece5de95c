use recipe_core::db::open_db_in_memory;
use recipe_core::{
    AttributeInput, MediaStore, Price, RecipeChanges, RecipeDraft, RecipeListQuery,
    RecipeService, RecipeServiceError, RecipeValidationError, SqliteRecipeRepository,
    SqliteUserRepository, UserId, UserService,
};
use rusqlite::Connection;

fn create_user(conn: &Connection, email: &str) -> UserId {
    let service = UserService::new(SqliteUserRepository::try_new(conn).unwrap());
    service.create_user(email, "testpass123", "").unwrap().id
}

fn draft(title: &str) -> RecipeDraft {
    RecipeDraft::new(title, 22, Price::parse("5.25").unwrap())
}

fn names(items: &[recipe_core::Attribute]) -> Vec<&str> {
    items.iter().map(|item| item.name.as_str()).collect()
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn create_recipe_with_new_tags_creates_them() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_user(&conn, "user@example.com");

    let recipe = {
        let mut service = RecipeService::new(SqliteRecipeRepository::try_new(&mut conn).unwrap());
        let mut input = draft("Thai Prawn Curry");
        input.tags = vec![AttributeInput::new("Thai"), AttributeInput::new("Dinner")];
        service.create_recipe(user_id, &input).unwrap()
    };

    assert_eq!(recipe.user_id, user_id);
    assert_eq!(recipe.price.to_string(), "5.25");
    assert_eq!(names(&recipe.tags), vec!["Dinner", "Thai"]);
    assert_eq!(count(&conn, "tags"), 2);
}

#[test]
fn create_recipe_reuses_existing_tag_of_same_user() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_user(&conn, "user@example.com");
    let mut service = RecipeService::new(SqliteRecipeRepository::try_new(&mut conn).unwrap());

    let mut first = draft("Pongal");
    first.tags = vec![AttributeInput::new("Indian")];
    let first = service.create_recipe(user_id, &first).unwrap();

    let mut second = draft("Dosa");
    second.tags = vec![AttributeInput::new("Indian"), AttributeInput::new("Breakfast")];
    let second = service.create_recipe(user_id, &second).unwrap();

    let indian_first = first.tags.iter().find(|tag| tag.name == "Indian").unwrap();
    let indian_second = second.tags.iter().find(|tag| tag.name == "Indian").unwrap();
    assert_eq!(indian_first.id, indian_second.id);
    drop(service);
    assert_eq!(count(&conn, "tags"), 2);
}

#[test]
fn tags_with_same_name_are_separate_per_user() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = create_user(&conn, "owner@example.com");
    let other = create_user(&conn, "other@example.com");
    let mut service = RecipeService::new(SqliteRecipeRepository::try_new(&mut conn).unwrap());

    let mut input = draft("Soup");
    input.ingredients = vec![AttributeInput::new("Salt")];
    let mine = service.create_recipe(owner, &input).unwrap();
    let theirs = service.create_recipe(other, &input).unwrap();

    assert_ne!(mine.ingredients[0].id, theirs.ingredients[0].id);
    assert_eq!(mine.ingredients[0].user_id, owner);
    assert_eq!(theirs.ingredients[0].user_id, other);
}

#[test]
fn duplicate_names_in_one_request_link_once() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_user(&conn, "user@example.com");
    let mut service = RecipeService::new(SqliteRecipeRepository::try_new(&mut conn).unwrap());

    let mut input = draft("Bread");
    input.ingredients = vec![
        AttributeInput::new("Flour"),
        AttributeInput::new(" Flour "),
    ];
    let recipe = service.create_recipe(user_id, &input).unwrap();
    assert_eq!(names(&recipe.ingredients), vec!["Flour"]);
}

#[test]
fn update_with_tags_replaces_and_absent_tags_are_kept() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_user(&conn, "user@example.com");
    let mut service = RecipeService::new(SqliteRecipeRepository::try_new(&mut conn).unwrap());

    let mut input = draft("Porridge");
    input.tags = vec![AttributeInput::new("Breakfast")];
    input.ingredients = vec![AttributeInput::new("Oats")];
    let recipe = service.create_recipe(user_id, &input).unwrap();

    let replaced = service
        .update_recipe(
            user_id,
            recipe.id,
            &RecipeChanges {
                tags: Some(vec![AttributeInput::new("Lunch")]),
                ..RecipeChanges::default()
            },
        )
        .unwrap();
    assert_eq!(names(&replaced.tags), vec!["Lunch"]);
    assert_eq!(names(&replaced.ingredients), vec!["Oats"]);

    let renamed = service
        .update_recipe(
            user_id,
            recipe.id,
            &RecipeChanges {
                title: Some("Overnight oats".to_string()),
                ..RecipeChanges::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.title, "Overnight oats");
    assert_eq!(names(&renamed.tags), vec!["Lunch"]);

    let cleared = service
        .update_recipe(
            user_id,
            recipe.id,
            &RecipeChanges {
                tags: Some(Vec::new()),
                ingredients: Some(Vec::new()),
                ..RecipeChanges::default()
            },
        )
        .unwrap();
    assert!(cleared.tags.is_empty());
    assert!(cleared.ingredients.is_empty());
    drop(service);
    // Clearing links keeps the tag rows themselves.
    assert_eq!(count(&conn, "tags"), 2);
}

#[test]
fn other_users_recipe_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = create_user(&conn, "owner@example.com");
    let other = create_user(&conn, "other@example.com");
    let mut service = RecipeService::new(SqliteRecipeRepository::try_new(&mut conn).unwrap());
    let recipe = service.create_recipe(owner, &draft("Secret")).unwrap();

    assert!(matches!(
        service.get_recipe(other, recipe.id),
        Err(RecipeServiceError::RecipeNotFound(id)) if id == recipe.id
    ));
    assert!(matches!(
        service.update_recipe(
            other,
            recipe.id,
            &RecipeChanges {
                title: Some("Stolen".to_string()),
                ..RecipeChanges::default()
            },
        ),
        Err(RecipeServiceError::RecipeNotFound(_))
    ));
    assert_eq!(service.get_recipe(owner, recipe.id).unwrap().title, "Secret");
}

#[test]
fn list_is_newest_first_and_scoped_to_user() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = create_user(&conn, "owner@example.com");
    let other = create_user(&conn, "other@example.com");
    let mut service = RecipeService::new(SqliteRecipeRepository::try_new(&mut conn).unwrap());

    let first = service.create_recipe(owner, &draft("First")).unwrap();
    let second = service.create_recipe(owner, &draft("Second")).unwrap();
    service.create_recipe(other, &draft("Foreign")).unwrap();

    let listed = service.list_recipes(&RecipeListQuery::for_user(owner)).unwrap();
    let ids: Vec<i64> = listed.iter().map(|recipe| recipe.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn list_filters_by_tag_and_ingredient_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_user(&conn, "user@example.com");
    let mut service = RecipeService::new(SqliteRecipeRepository::try_new(&mut conn).unwrap());

    let mut curry = draft("Curry");
    curry.tags = vec![AttributeInput::new("Vegan")];
    curry.ingredients = vec![AttributeInput::new("Feta")];
    let curry = service.create_recipe(user_id, &curry).unwrap();

    let mut tahini = draft("Tahini");
    tahini.tags = vec![AttributeInput::new("Vegetarian")];
    let tahini = service.create_recipe(user_id, &tahini).unwrap();

    let plain = service.create_recipe(user_id, &draft("Fish and chips")).unwrap();

    let by_tags = service
        .list_recipes(&RecipeListQuery {
            tag_ids: vec![curry.tags[0].id, tahini.tags[0].id],
            ..RecipeListQuery::for_user(user_id)
        })
        .unwrap();
    let ids: Vec<i64> = by_tags.iter().map(|recipe| recipe.id).collect();
    assert_eq!(ids, vec![tahini.id, curry.id]);
    assert!(!ids.contains(&plain.id));

    let by_ingredient = service
        .list_recipes(&RecipeListQuery {
            ingredient_ids: vec![curry.ingredients[0].id],
            ..RecipeListQuery::for_user(user_id)
        })
        .unwrap();
    assert_eq!(by_ingredient.len(), 1);
    assert_eq!(by_ingredient[0].id, curry.id);
}

#[test]
fn invalid_draft_is_rejected_before_storage() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_user(&conn, "user@example.com");
    {
        let mut service =
            RecipeService::new(SqliteRecipeRepository::try_new(&mut conn).unwrap());
        let mut input = draft("   ");
        input.tags = vec![AttributeInput::new("Quick")];
        assert!(matches!(
            service.create_recipe(user_id, &input),
            Err(RecipeServiceError::Validation(RecipeValidationError::BlankTitle))
        ));
    }
    assert_eq!(count(&conn, "recipes"), 0);
    assert_eq!(count(&conn, "tags"), 0);
}

#[test]
fn upload_image_stores_file_and_replaces_previous() {
    let media_dir = tempfile::tempdir().unwrap();
    let media = MediaStore::new(media_dir.path());
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_user(&conn, "user@example.com");
    let mut service = RecipeService::new(SqliteRecipeRepository::try_new(&mut conn).unwrap());
    let recipe = service.create_recipe(user_id, &draft("Pie")).unwrap();

    let with_image = service
        .upload_image(user_id, recipe.id, &media, "pie.JPG", b"first-bytes")
        .unwrap();
    let first_path = with_image.image.clone().unwrap();
    assert!(first_path.starts_with("uploads/recipe/"));
    assert!(first_path.ends_with(".jpg"));
    assert!(media.resolve(&first_path).unwrap().exists());

    let replaced = service
        .upload_image(user_id, recipe.id, &media, "pie.png", b"second-bytes")
        .unwrap();
    let second_path = replaced.image.unwrap();
    assert_ne!(first_path, second_path);
    assert!(!media.resolve(&first_path).unwrap().exists());
    assert!(media.resolve(&second_path).unwrap().exists());

    service.delete_recipe(user_id, recipe.id, &media).unwrap();
    assert!(!media.resolve(&second_path).unwrap().exists());
    assert!(matches!(
        service.get_recipe(user_id, recipe.id),
        Err(RecipeServiceError::RecipeNotFound(_))
    ));
}

#[test]
fn upload_image_rejects_empty_file_and_bad_extension() {
    let media_dir = tempfile::tempdir().unwrap();
    let media = MediaStore::new(media_dir.path());
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_user(&conn, "user@example.com");
    let mut service = RecipeService::new(SqliteRecipeRepository::try_new(&mut conn).unwrap());
    let recipe = service.create_recipe(user_id, &draft("Pie")).unwrap();

    assert!(matches!(
        service.upload_image(user_id, recipe.id, &media, "pie.jpg", b""),
        Err(RecipeServiceError::Validation(RecipeValidationError::MissingImage))
    ));
    assert!(matches!(
        service.upload_image(user_id, recipe.id, &media, "notimage.txt", b"text"),
        Err(RecipeServiceError::Media(_))
    ));
    assert!(service.get_recipe(user_id, recipe.id).unwrap().image.is_none());
}
