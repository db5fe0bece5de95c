//! JSON request and response bodies.
//!
//! Response bodies are built from core records; request bodies convert into
//! core inputs. Field names follow the public API.

use crate::error::ApiError;
use recipe_core::model::user::validate_password;
use recipe_core::{
    Attribute, AttributeInput, BannerImage, Price, Recipe, RecipeChanges, RecipeDraft, User,
    UserChanges,
};
use serde::{Deserialize, Deserializer, Serialize};

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";

/// Write-body field that keeps an absent key apart from an explicit `null`.
///
/// Used with `#[serde(default)]`: a missing key stays [`WriteField::Absent`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteField<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for WriteField<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for WriteField<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Self::Null, Self::Value))
    }
}

impl<T> WriteField<T> {
    /// Absent keys become `None`; `null` is rejected for `field`.
    pub fn into_option(self, field: &'static str) -> Result<Option<T>, ApiError> {
        match self {
            Self::Absent => Ok(None),
            Self::Null => Err(ApiError::field(field, NOT_NULL)),
            Self::Value(value) => Ok(Some(value)),
        }
    }
}

/// `{id, name}` body shared by tags and ingredients.
#[derive(Debug, Serialize)]
pub struct AttributeResponse {
    pub id: i64,
    pub name: String,
}

impl From<&Attribute> for AttributeResponse {
    fn from(value: &Attribute) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
        }
    }
}

/// Tag/ingredient update body; `name` is required on `PUT`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AttributeRequest {
    pub name: WriteField<String>,
}

impl AttributeRequest {
    /// Returns the new name, or `None` for a `PATCH` that leaves it alone.
    pub fn into_name(self, partial: bool) -> Result<Option<String>, ApiError> {
        let name = self.name.into_option("name")?;
        if name.is_none() && !partial {
            return Err(ApiError::field("name", REQUIRED));
        }
        Ok(name)
    }
}

/// Recipe list body.
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub time_minutes: i64,
    pub price: Price,
    pub link: String,
    pub tags: Vec<AttributeResponse>,
    pub ingredients: Vec<AttributeResponse>,
}

impl From<&Recipe> for RecipeResponse {
    fn from(value: &Recipe) -> Self {
        Self {
            id: value.id,
            title: value.title.clone(),
            time_minutes: value.time_minutes,
            price: value.price,
            link: value.link.clone(),
            tags: value.tags.iter().map(AttributeResponse::from).collect(),
            ingredients: value.ingredients.iter().map(AttributeResponse::from).collect(),
        }
    }
}

/// Recipe detail body: the list fields plus description and image URL.
#[derive(Debug, Serialize)]
pub struct RecipeDetailResponse {
    #[serde(flatten)]
    pub recipe: RecipeResponse,
    pub description: String,
    pub image: Option<String>,
}

impl RecipeDetailResponse {
    pub fn new(recipe: &Recipe, url_for: impl Fn(&str) -> String) -> Self {
        Self {
            recipe: RecipeResponse::from(recipe),
            description: recipe.description.clone(),
            image: recipe.image.as_deref().map(url_for),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeImageResponse {
    pub id: i64,
    pub image: Option<String>,
}

impl RecipeImageResponse {
    pub fn new(recipe: &Recipe, url_for: impl Fn(&str) -> String) -> Self {
        Self {
            id: recipe.id,
            image: recipe.image.as_deref().map(url_for),
        }
    }
}

/// Recipe write body.
///
/// Every field is optional at the JSON level so one shape serves create,
/// `PUT` and `PATCH`; [`RecipeRequest::into_draft`] and
/// [`RecipeRequest::into_changes`] enforce the required ones. No field
/// accepts `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecipeRequest {
    pub title: WriteField<String>,
    pub time_minutes: WriteField<i64>,
    pub price: WriteField<Price>,
    pub link: WriteField<String>,
    pub description: WriteField<String>,
    pub tags: WriteField<Vec<AttributeInput>>,
    pub ingredients: WriteField<Vec<AttributeInput>>,
}

impl RecipeRequest {
    pub fn into_draft(self) -> Result<RecipeDraft, ApiError> {
        let fields = self.into_present_fields()?;
        require_core_fields(&fields)?;
        let mut draft = RecipeDraft::new(
            fields.title.unwrap_or_default(),
            fields.time_minutes.unwrap_or_default(),
            fields.price.unwrap_or_default(),
        );
        draft.link = fields.link.unwrap_or_default();
        draft.description = fields.description.unwrap_or_default();
        draft.tags = fields.tags.unwrap_or_default();
        draft.ingredients = fields.ingredients.unwrap_or_default();
        Ok(draft)
    }

    /// Converts into a partial update; `partial = false` is a full `PUT`.
    pub fn into_changes(self, partial: bool) -> Result<RecipeChanges, ApiError> {
        let changes = self.into_present_fields()?;
        if !partial {
            require_core_fields(&changes)?;
        }
        Ok(changes)
    }

    fn into_present_fields(self) -> Result<RecipeChanges, ApiError> {
        Ok(RecipeChanges {
            title: self.title.into_option("title")?,
            time_minutes: self.time_minutes.into_option("time_minutes")?,
            price: self.price.into_option("price")?,
            link: self.link.into_option("link")?,
            description: self.description.into_option("description")?,
            tags: self.tags.into_option("tags")?,
            ingredients: self.ingredients.into_option("ingredients")?,
        })
    }
}

fn require_core_fields(fields: &RecipeChanges) -> Result<(), ApiError> {
    if fields.title.is_none() {
        return Err(ApiError::field("title", REQUIRED));
    }
    if fields.time_minutes.is_none() {
        return Err(ApiError::field("time_minutes", REQUIRED));
    }
    if fields.price.is_none() {
        return Err(ApiError::field("price", REQUIRED));
    }
    Ok(())
}

/// `{id, banner_image, uploaded_at}` with the image as a URL.
#[derive(Debug, Serialize)]
pub struct BannerImageResponse {
    pub id: i64,
    pub banner_image: String,
    pub uploaded_at: Option<String>,
}

impl BannerImageResponse {
    pub fn new(banner: &BannerImage, url_for: impl Fn(&str) -> String) -> Self {
        Self {
            id: banner.id,
            banner_image: url_for(&banner.banner_image),
            uploaded_at: banner.uploaded_at_rfc3339(),
        }
    }
}

/// Public user body; the password is never echoed.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(value: &User) -> Self {
        Self {
            email: value.email.clone(),
            name: value.name.clone(),
        }
    }
}

/// User write body for sign-up and profile updates.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserRequest {
    pub email: WriteField<String>,
    pub password: WriteField<String>,
    pub name: WriteField<String>,
}

impl UserRequest {
    /// Validates a sign-up body and returns `(email, password, name)`.
    pub fn into_new_user(self) -> Result<(String, String, String), ApiError> {
        let changes = self.into_changes(false)?;
        let email = changes.email.ok_or_else(|| ApiError::field("email", REQUIRED))?;
        let password = changes
            .password
            .ok_or_else(|| ApiError::field("password", REQUIRED))?;
        Ok((email, password, changes.name.unwrap_or_default()))
    }

    /// Converts into a profile update; `partial = false` is a full `PUT`.
    pub fn into_changes(self, partial: bool) -> Result<UserChanges, ApiError> {
        let email = self.email.into_option("email")?;
        let password = self.password.into_option("password")?;
        let name = self.name.into_option("name")?;
        if !partial {
            if email.is_none() {
                return Err(ApiError::field("email", REQUIRED));
            }
            if password.is_none() {
                return Err(ApiError::field("password", REQUIRED));
            }
        }
        if let Some(password) = &password {
            validate_password(password)
                .map_err(|err| ApiError::field("password", err.to_string()))?;
        }
        Ok(UserChanges {
            email,
            name,
            password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthTokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthTokenResponse {
    pub token: String,
}

/// Parses a comma separated id list such as `1,2,3`.
pub fn parse_id_list(field: &'static str, raw: &str) -> Result<Vec<i64>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| ApiError::field(field, format!("`{part}` is not a valid id")))
        })
        .collect()
}

/// Parses the integer flag used by `assigned_only`; any non-zero value is on.
pub fn parse_flag(field: &'static str, raw: &str) -> Result<bool, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map(|value| value != 0)
        .map_err(|_| ApiError::field(field, format!("`{raw}` is not a valid integer")))
}

#[cfg(test)]
mod tests {
    use super::{
        parse_flag, parse_id_list, AttributeRequest, RecipeDetailResponse, RecipeRequest,
        UserRequest, WriteField,
    };
    use crate::error::ApiError;
    use recipe_core::{Attribute, Price, Recipe};
    use serde_json::json;

    fn sample_recipe() -> Recipe {
        Recipe {
            id: 3,
            user_id: 1,
            title: "Soup".to_string(),
            description: "Hot".to_string(),
            time_minutes: 10,
            price: Price::from_cents(550).unwrap(),
            link: String::new(),
            image: Some("uploads/recipe/a.png".to_string()),
            tags: vec![Attribute {
                id: 9,
                user_id: 1,
                name: "Dinner".to_string(),
            }],
            ingredients: Vec::new(),
        }
    }

    #[test]
    fn detail_body_flattens_list_fields() {
        let body = RecipeDetailResponse::new(&sample_recipe(), |path| format!("/media/{path}"));
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "title": "Soup",
                "time_minutes": 10,
                "price": "5.50",
                "link": "",
                "tags": [{"id": 9, "name": "Dinner"}],
                "ingredients": [],
                "description": "Hot",
                "image": "/media/uploads/recipe/a.png",
            })
        );
    }

    #[test]
    fn create_requires_title_time_and_price() {
        let request: RecipeRequest =
            serde_json::from_value(json!({"title": "Soup", "price": "1.00"})).unwrap();
        assert!(matches!(
            request.into_draft(),
            Err(ApiError::Field {
                field: "time_minutes",
                ..
            })
        ));
    }

    #[test]
    fn patch_keeps_absent_tags_absent_and_empty_tags_empty() {
        let request: RecipeRequest = serde_json::from_value(json!({"title": "New"})).unwrap();
        assert!(request.into_changes(true).unwrap().tags.is_none());

        let request: RecipeRequest = serde_json::from_value(json!({"tags": []})).unwrap();
        assert_eq!(request.into_changes(true).unwrap().tags, Some(Vec::new()));
    }

    #[test]
    fn price_accepts_numbers_and_strings() {
        let request: RecipeRequest =
            serde_json::from_value(json!({"price": 5.5})).unwrap();
        assert_eq!(request.into_changes(true).unwrap().price.unwrap().cents(), 550);
        let request: RecipeRequest =
            serde_json::from_value(json!({"price": "12.05"})).unwrap();
        assert_eq!(request.into_changes(true).unwrap().price.unwrap().cents(), 1205);
    }

    #[test]
    fn null_differs_from_an_absent_key() {
        let request: RecipeRequest =
            serde_json::from_value(json!({"title": null})).unwrap();
        assert_eq!(request.title, WriteField::Null);
        assert_eq!(request.price, WriteField::Absent);
        assert!(matches!(
            request.into_changes(true),
            Err(ApiError::Field { field: "title", .. })
        ));

        let request: RecipeRequest = serde_json::from_value(json!({"tags": null})).unwrap();
        assert!(matches!(
            request.into_changes(true),
            Err(ApiError::Field { field: "tags", .. })
        ));
    }

    #[test]
    fn null_is_rejected_in_user_and_attribute_bodies() {
        let request: UserRequest =
            serde_json::from_value(json!({"email": "a@example.com", "password": "secret", "name": null}))
                .unwrap();
        assert!(matches!(
            request.into_new_user(),
            Err(ApiError::Field { field: "name", .. })
        ));

        let request: AttributeRequest = serde_json::from_value(json!({"name": null})).unwrap();
        assert!(matches!(
            request.into_name(true),
            Err(ApiError::Field { field: "name", .. })
        ));
        let request: AttributeRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.into_name(true).unwrap(), None);
    }

    #[test]
    fn id_lists_and_flags_parse() {
        assert_eq!(parse_id_list("tags", "1, 2,3").unwrap(), vec![1, 2, 3]);
        assert!(parse_id_list("tags", "1,x").is_err());
        assert!(parse_flag("assigned_only", "1").unwrap());
        assert!(!parse_flag("assigned_only", "0").unwrap());
        assert!(parse_flag("assigned_only", "yes").is_err());
    }
}
