use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::{
    audit,
    dto::catalog::CategoryList,
    entity::categories::{
        ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
        Model as CategoryModel,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Category,
    response::{ApiResponse, Meta},
    slug::slugify,
    state::AppState,
    uploads::{self, AssetBase, MultipartForm},
};

pub async fn list_categories(
    state: &AppState,
    assets: &AssetBase,
) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_desc(CategoryCol::CreatedAt)
        .order_by_desc(CategoryCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| category_from_entity(c, assets))
        .collect();
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

fn slug_for(name: &str) -> AppResult<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::bad_request(
            "Category name must contain letters or digits",
        ));
    }
    Ok(slug)
}

async fn ensure_slug_free(state: &AppState, slug: &str, except: Option<i32>) -> AppResult<()> {
    let mut finder = Categories::find().filter(CategoryCol::Slug.eq(slug));
    if let Some(id) = except {
        finder = finder.filter(CategoryCol::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict("Category already exists".into()));
    }
    Ok(())
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    form: MultipartForm,
) -> AppResult<ApiResponse<Category>> {
    let name = form
        .text("name")
        .ok_or_else(|| AppError::bad_request("Category name is required"))?;
    let slug = slug_for(&name)?;
    ensure_slug_free(state, &slug, None).await?;

    let image = match form.file("category_image") {
        Some(file) => Some(uploads::store(&state.config.upload_dir, file).await?),
        None => None,
    };

    let active = CategoryActive {
        id: NotSet,
        name: Set(name),
        slug: Set(slug),
        category_image: Set(image.clone()),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let category = match active.insert(&state.orm).await {
        Ok(category) => category,
        Err(err) => {
            uploads::remove(&state.config.upload_dir, &image.into_iter().collect::<Vec<_>>()).await;
            return Err(err.into());
        }
    };

    audit::record(
        state,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id, "slug": category.slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category, assets),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    id: i32,
    form: MultipartForm,
) -> AppResult<ApiResponse<Category>> {
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;

    let renamed = match form.text("name") {
        Some(name) => {
            let slug = slug_for(&name)?;
            ensure_slug_free(state, &slug, Some(id)).await?;
            Some((name, slug))
        }
        None => None,
    };

    let image = match form.file("category_image") {
        Some(file) => Some(uploads::store(&state.config.upload_dir, file).await?),
        None => None,
    };

    let old_image = existing.category_image.clone();
    let mut active: CategoryActive = existing.into();
    if let Some((name, slug)) = renamed {
        active.name = Set(name);
        active.slug = Set(slug);
    }
    if let Some(name) = &image {
        active.category_image = Set(Some(name.clone()));
    }
    active.updated_at = Set(Utc::now().into());

    let category = active.update(&state.orm).await?;
    if image.is_some() {
        uploads::remove(&state.config.upload_dir, &old_image.into_iter().collect::<Vec<_>>()).await;
    }

    audit::record(
        state,
        Some(user.user_id),
        "category_update",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category updated",
        category_from_entity(category, assets),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;

    Categories::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|err| match AppError::from(err) {
            e if e.status() == axum::http::StatusCode::CONFLICT => {
                AppError::Conflict("Category has products referenced by orders".into())
            }
            e => e,
        })?;

    uploads::remove(
        &state.config.upload_dir,
        &existing.category_image.into_iter().collect::<Vec<_>>(),
    )
    .await;

    audit::record(
        state,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub fn category_from_entity(model: CategoryModel, assets: &AssetBase) -> Category {
    Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
        category_image: assets.url_opt(model.category_image.as_deref()),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
