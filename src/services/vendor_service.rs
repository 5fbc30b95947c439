use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::{
    audit,
    dto::{
        catalog::ProductList,
        orders::OrderItemList,
        vendor::ProductInput,
    },
    entity::{
        categories::{Column as CategoryCol, Entity as Categories, Model as CategoryModel},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        product_images::{ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages},
        products::{
            ActiveModel as ProductActive, Column as ProductCol, Entity as Products,
            Model as ProductModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_vendor},
    models::{Product, ProductStatus},
    response::{ApiResponse, Meta},
    services::{
        catalog_service::{load_galleries, product_from_entity},
        order_service::order_item_from_entity,
    },
    state::AppState,
    uploads::{self, AssetBase, FileField, MultipartForm},
};

pub const MAX_GALLERY_IMAGES: usize = 5;

/// File fields accepted by the add and update product forms.
pub const PRODUCT_FILES: &[FileField] = &[
    FileField::image("product_image", 1),
    FileField::image("gallery_images", MAX_GALLERY_IMAGES),
];

async fn category_by_name<C: ConnectionTrait>(conn: &C, name: &str) -> AppResult<CategoryModel> {
    Categories::find()
        .filter(CategoryCol::Name.eq(name))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::bad_request(format!("Category '{name}' not found")))
}

async fn own_product(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .filter(ProductCol::VendorId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))
}

async fn insert_gallery<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    names: &[String],
) -> AppResult<()> {
    if names.is_empty() {
        return Ok(());
    }
    let rows = names.iter().enumerate().map(|(position, name)| ImageActive {
        id: NotSet,
        product_id: Set(product_id),
        image: Set(name.clone()),
        position: Set(position as i32),
        created_at: NotSet,
    });
    ProductImages::insert_many(rows).exec(conn).await?;
    Ok(())
}

pub async fn add_product(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    form: MultipartForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_vendor(user)?;

    let input = ProductInput::from_form(&form)?;
    if !input.is_complete() {
        return Err(AppError::bad_request("All product fields are required"));
    }
    let image = form
        .file("product_image")
        .ok_or_else(|| AppError::bad_request("product_image is required"))?;
    let gallery = form.files("gallery_images");
    if gallery.is_empty() {
        return Err(AppError::bad_request(
            "At least one gallery image is required",
        ));
    }

    let category_name = input.category_name.clone().unwrap_or_default();
    let category = category_by_name(&state.orm, &category_name).await?;

    let upload_dir = &state.config.upload_dir;
    let image_name = uploads::store(upload_dir, image).await?;
    let gallery_names = match uploads::store_all(upload_dir, gallery).await {
        Ok(names) => names,
        Err(err) => {
            uploads::remove(upload_dir, std::slice::from_ref(&image_name)).await;
            return Err(err);
        }
    };

    let result = async {
        let txn = state.orm.begin().await?;
        let product = ProductActive {
            id: NotSet,
            vendor_id: Set(user.user_id),
            category_id: Set(category.id),
            name: Set(input.name.clone().unwrap_or_default()),
            description: Set(input.description.clone()),
            product_image: Set(Some(image_name.clone())),
            price: Set(input.price.unwrap_or_default()),
            discount_price: Set(input.discount_price.unwrap_or_default()),
            stock: Set(input.stock.unwrap_or_default()),
            status: Set(ProductStatus::Pending),
            rating: NotSet,
            is_popular: NotSet,
            is_feature: NotSet,
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;
        insert_gallery(&txn, product.id, &gallery_names).await?;
        txn.commit().await?;
        Ok::<_, AppError>(product)
    }
    .await;

    let product = match result {
        Ok(product) => product,
        Err(err) => {
            let mut stored = gallery_names;
            stored.push(image_name);
            uploads::remove(upload_dir, &stored).await;
            return Err(err);
        }
    };

    tracing::info!(product_id = product.id, vendor_id = user.user_id, "product submitted");
    audit::record(
        state,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    let mut galleries = load_galleries(&state.orm, &[product.id]).await?;
    let gallery = galleries.remove(&product.id).unwrap_or_default();
    Ok(ApiResponse::success(
        "Product added successfully and is waiting for admin approval",
        product_from_entity(product, Some(category), Some(gallery), assets),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    id: i32,
    form: MultipartForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_vendor(user)?;
    let existing = own_product(state, user, id).await?;
    let input = ProductInput::from_form(&form)?;

    let category = match &input.category_name {
        Some(name) => Some(category_by_name(&state.orm, name).await?),
        None => None,
    };

    let upload_dir = &state.config.upload_dir;
    let image_name = match form.file("product_image") {
        Some(file) => Some(uploads::store(upload_dir, file).await?),
        None => None,
    };
    let gallery_names = match uploads::store_all(upload_dir, form.files("gallery_images")).await {
        Ok(names) => names,
        Err(err) => {
            uploads::remove(upload_dir, &image_name.into_iter().collect::<Vec<_>>()).await;
            return Err(err);
        }
    };

    let old_image = existing.product_image.clone();
    let was_rejected = existing.status == ProductStatus::Rejected;

    let result = async {
        let txn = state.orm.begin().await?;

        let mut active: ProductActive = existing.into();
        if let Some(category) = &category {
            active.category_id = Set(category.id);
        }
        if let Some(name) = input.name.clone() {
            active.name = Set(name);
        }
        if let Some(description) = input.description.clone() {
            active.description = Set(Some(description));
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(discount_price) = input.discount_price {
            active.discount_price = Set(discount_price);
        }
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        if let Some(name) = &image_name {
            active.product_image = Set(Some(name.clone()));
        }
        if was_rejected {
            active.status = Set(ProductStatus::Pending);
        }
        active.updated_at = Set(Utc::now().into());
        let product = active.update(&txn).await?;

        let mut replaced = Vec::new();
        if !gallery_names.is_empty() {
            let old = ProductImages::find()
                .filter(ImageCol::ProductId.eq(product.id))
                .all(&txn)
                .await?;
            ProductImages::delete_many()
                .filter(ImageCol::ProductId.eq(product.id))
                .exec(&txn)
                .await?;
            insert_gallery(&txn, product.id, &gallery_names).await?;
            replaced.extend(old.into_iter().map(|img| img.image));
        }

        txn.commit().await?;
        Ok::<_, AppError>((product, replaced))
    }
    .await;

    let (product, mut replaced) = match result {
        Ok(done) => done,
        Err(err) => {
            let mut stored = gallery_names;
            stored.extend(image_name);
            uploads::remove(upload_dir, &stored).await;
            return Err(err);
        }
    };
    if image_name.is_some() {
        replaced.extend(old_image);
    }
    uploads::remove(upload_dir, &replaced).await;

    audit::record(
        state,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id, "resubmitted": was_rejected }),
    )
    .await;

    let category = match category {
        Some(category) => Some(category),
        None => Categories::find_by_id(product.category_id).one(&state.orm).await?,
    };
    let mut galleries = load_galleries(&state.orm, &[product.id]).await?;
    let gallery = galleries.remove(&product.id).unwrap_or_default();
    Ok(ApiResponse::success(
        "Product updated successfully",
        product_from_entity(product, category, Some(gallery), assets),
        Some(Meta::empty()),
    ))
}

pub async fn vendor_products(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_vendor(user)?;

    let rows = Products::find()
        .find_also_related(Categories)
        .filter(ProductCol::VendorId.eq(user.user_id))
        .order_by_desc(ProductCol::CreatedAt)
        .order_by_desc(ProductCol::Id)
        .all(&state.orm)
        .await?;

    let ids: Vec<i32> = rows.iter().map(|(p, _)| p.id).collect();
    let mut galleries = load_galleries(&state.orm, &ids).await?;
    let items = rows
        .into_iter()
        .map(|(product, category)| {
            let gallery = galleries.remove(&product.id).unwrap_or_default();
            product_from_entity(product, category, Some(gallery), assets)
        })
        .collect();

    Ok(ApiResponse::success(
        "Vendor products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn single_product(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    id: i32,
) -> AppResult<ApiResponse<Product>> {
    ensure_vendor(user)?;
    let product = own_product(state, user, id).await?;
    let category = Categories::find_by_id(product.category_id)
        .one(&state.orm)
        .await?;
    let mut galleries = load_galleries(&state.orm, &[product.id]).await?;
    let gallery = galleries.remove(&product.id).unwrap_or_default();
    Ok(ApiResponse::success(
        "Product",
        product_from_entity(product, category, Some(gallery), assets),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_vendor(user)?;
    let product = own_product(state, user, id).await?;

    let gallery = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product.id))
        .all(&state.orm)
        .await?;

    Products::delete_by_id(product.id)
        .exec(&state.orm)
        .await
        .map_err(|err| match AppError::from(err) {
            e if e.status() == axum::http::StatusCode::CONFLICT => {
                AppError::Conflict("Product has orders and can not be deleted".into())
            }
            e => e,
        })?;

    let files: Vec<String> = gallery
        .into_iter()
        .map(|img| img.image)
        .chain(product.product_image)
        .collect();
    uploads::remove(&state.config.upload_dir, &files).await;

    audit::record(
        state,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

/// Line items sold by the calling vendor, newest first.
pub async fn vendor_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderItemList>> {
    ensure_vendor(user)?;
    let items = OrderItems::find()
        .filter(OrderItemCol::VendorId.eq(user.user_id))
        .order_by_desc(OrderItemCol::CreatedAt)
        .order_by_desc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Vendor orders",
        OrderItemList { items },
        Some(Meta::empty()),
    ))
}
