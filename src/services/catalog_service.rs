use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::{
    dto::catalog::{ProductCatalog, ProductFilter, ProductList},
    entity::{
        categories::{Column as CategoryCol, Entity as Categories, Model as CategoryModel},
        product_images::{Column as ImageCol, Entity as ProductImages, Model as ImageModel},
        products::{Column as ProductCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::{CategoryRef, Product, ProductImage, ProductStatus},
    response::{ApiResponse, Meta},
    state::AppState,
    uploads::AssetBase,
};

#[derive(Debug, FromQueryResult)]
struct PriceRange {
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    total: i64,
}

/// Approved products matching the filter, plus price bounds and a count taken
/// over the whole approved catalog so a price slider keeps stable bounds.
pub async fn list_products(
    state: &AppState,
    assets: &AssetBase,
    filter: ProductFilter,
) -> AppResult<ApiResponse<ProductCatalog>> {
    let (min_price, max_price) = filter.price_bounds();

    let mut condition = Condition::all().add(ProductCol::Status.eq(ProductStatus::Approved));
    if let Some(min) = min_price {
        condition = condition.add(ProductCol::Price.gte(min));
    }
    if let Some(max) = max_price {
        condition = condition.add(ProductCol::Price.lte(max));
    }
    if let Some(slug) = filter.category_slug.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(CategoryCol::Slug.eq(slug.as_str()));
    }

    let rows = Products::find()
        .find_also_related(Categories)
        .filter(condition)
        .order_by_desc(ProductCol::CreatedAt)
        .order_by_desc(ProductCol::Id)
        .all(&state.orm)
        .await?;

    let range = Products::find()
        .select_only()
        .column_as(ProductCol::Price.min(), "min_price")
        .column_as(ProductCol::Price.max(), "max_price")
        .column_as(ProductCol::Id.count(), "total")
        .filter(ProductCol::Status.eq(ProductStatus::Approved))
        .into_model::<PriceRange>()
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::internal("price range query returned no row"))?;

    let products: Vec<Product> = rows
        .into_iter()
        .map(|(product, category)| product_from_entity(product, category, None, assets))
        .collect();

    let data = ProductCatalog {
        filter_product_count: products.len(),
        products,
        total_products: u64::try_from(range.total).unwrap_or_default(),
        min_price: range.min_price,
        max_price: range.max_price,
    };
    Ok(ApiResponse::success("Products", data, Some(Meta::empty())))
}

pub async fn product_detail(
    state: &AppState,
    assets: &AssetBase,
    id: i32,
) -> AppResult<ApiResponse<Product>> {
    let (product, category) = Products::find_by_id(id)
        .find_also_related(Categories)
        .filter(ProductCol::Status.eq(ProductStatus::Approved))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    let mut galleries = load_galleries(&state.orm, &[product.id]).await?;
    let gallery = galleries.remove(&product.id).unwrap_or_default();

    Ok(ApiResponse::success(
        "Product",
        product_from_entity(product, category, Some(gallery), assets),
        Some(Meta::empty()),
    ))
}

pub async fn popular_products(
    state: &AppState,
    assets: &AssetBase,
) -> AppResult<ApiResponse<ProductList>> {
    flagged_products(state, assets, ProductCol::IsPopular, "Popular products").await
}

pub async fn featured_products(
    state: &AppState,
    assets: &AssetBase,
) -> AppResult<ApiResponse<ProductList>> {
    flagged_products(state, assets, ProductCol::IsFeature, "Featured products").await
}

async fn flagged_products(
    state: &AppState,
    assets: &AssetBase,
    flag: ProductCol,
    message: &str,
) -> AppResult<ApiResponse<ProductList>> {
    let items = Products::find()
        .find_also_related(Categories)
        .filter(ProductCol::Status.eq(ProductStatus::Approved))
        .filter(flag.eq(true))
        .order_by_desc(ProductCol::UpdatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(product, category)| product_from_entity(product, category, None, assets))
        .collect();
    Ok(ApiResponse::success(
        message,
        ProductList { items },
        Some(Meta::empty()),
    ))
}

/// Gallery images for the given products, keyed by product id and ordered by position.
pub async fn load_galleries<C: ConnectionTrait>(
    conn: &C,
    product_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<ImageModel>>> {
    let mut galleries: HashMap<i32, Vec<ImageModel>> = HashMap::new();
    if product_ids.is_empty() {
        return Ok(galleries);
    }

    let images = ProductImages::find()
        .filter(ImageCol::ProductId.is_in(product_ids.iter().copied()))
        .order_by_asc(ImageCol::ProductId)
        .order_by_asc(ImageCol::Position)
        .order_by_asc(ImageCol::Id)
        .all(conn)
        .await?;
    for image in images {
        galleries.entry(image.product_id).or_default().push(image);
    }
    Ok(galleries)
}

pub fn product_from_entity(
    model: ProductModel,
    category: Option<CategoryModel>,
    gallery: Option<Vec<ImageModel>>,
    assets: &AssetBase,
) -> Product {
    Product {
        id: model.id,
        vendor_id: model.vendor_id,
        category_id: model.category_id,
        name: model.name,
        description: model.description,
        product_image: assets.url_opt(model.product_image.as_deref()),
        price: model.price,
        discount_price: model.discount_price,
        stock: model.stock,
        status: model.status,
        rating: model.rating,
        is_popular: model.is_popular,
        is_feature: model.is_feature,
        category: category.map(|c| CategoryRef {
            id: c.id,
            name: c.name,
            slug: c.slug,
        }),
        gallery_images: gallery.map(|images| {
            images
                .into_iter()
                .map(|image| ProductImage {
                    id: image.id,
                    url: assets.url(&image.image),
                    position: image.position,
                })
                .collect()
        }),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductModel {
        let now = Utc::now().fixed_offset();
        ProductModel {
            id: 3,
            vendor_id: 9,
            category_id: 2,
            name: "Desk lamp".into(),
            description: None,
            product_image: Some("lamp.png".into()),
            price: Decimal::new(1999, 2),
            discount_price: Decimal::new(1500, 2),
            stock: 4,
            status: ProductStatus::Approved,
            rating: 0.0,
            is_popular: false,
            is_feature: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn rewrites_image_names_to_asset_urls() {
        let now = Utc::now().fixed_offset();
        let gallery = vec![ImageModel {
            id: 1,
            product_id: 3,
            image: "g1.png".into(),
            position: 0,
            created_at: now,
        }];
        let assets = AssetBase::new("http://shop.test");
        let product = product_from_entity(product(), None, Some(gallery), &assets);

        assert_eq!(
            product.product_image.as_deref(),
            Some("http://shop.test/assets/lamp.png")
        );
        let gallery = product.gallery_images.unwrap();
        assert_eq!(gallery[0].url, "http://shop.test/assets/g1.png");
    }

    #[test]
    fn listing_shape_omits_gallery_and_category_when_not_loaded() {
        let assets = AssetBase::new("http://shop.test");
        let json = serde_json::to_value(product_from_entity(product(), None, None, &assets)).unwrap();
        assert!(json.get("gallery_images").is_none());
        assert!(json.get("category").is_none());
        let price = json["price"].as_f64().unwrap();
        assert!((price - 19.99).abs() < 1e-9);
    }
}
