use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{
            FeatureRequest, PopularityRequest, ProductStatusRequest, UserList,
            VendorStatusRequest, VendorStatusResponse,
        },
        auth::{AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest},
        catalog::{CategoryList, ProductCatalog, ProductFilter, ProductList},
        orders::{
            CartLine, CheckoutRequest, CheckoutResponse, OrderItemList, OrderList, OrderWithItems,
            UpdateOrderStatusRequest,
        },
        vendor::ProductInput,
    },
    models::{
        Category, CategoryRef, Order, OrderItem, OrderStatus, Product, ProductImage,
        ProductStatus, Role, User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, health, params, user, vendor},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        user::register,
        user::login,
        user::logout,
        user::profile,
        user::update_profile,
        user::all_categories,
        user::products,
        user::product_detail,
        user::popular_products,
        user::featured_products,
        user::checkout,
        user::my_orders,
        user::my_order,
        vendor::add_product,
        vendor::update_product,
        vendor::vendor_products,
        vendor::single_product,
        vendor::delete_product,
        vendor::vendor_orders,
        admin::admin_login,
        admin::admin_profile,
        admin::update_admin_profile,
        admin::update_vendor_status,
        admin::update_product_status,
        admin::update_popularity,
        admin::update_featured,
        admin::create_category,
        admin::all_categories,
        admin::update_category,
        admin::delete_category,
        admin::all_users,
        admin::all_vendors,
        admin::single_vendor_products,
        admin::list_all_orders,
        admin::update_order_status
    ),
    components(
        schemas(
            Role,
            User,
            Category,
            CategoryRef,
            Product,
            ProductImage,
            ProductStatus,
            Order,
            OrderItem,
            OrderStatus,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            ProfileUpdate,
            ProductFilter,
            ProductCatalog,
            ProductList,
            CategoryList,
            ProductInput,
            CartLine,
            CheckoutRequest,
            CheckoutResponse,
            OrderList,
            OrderWithItems,
            OrderItemList,
            UpdateOrderStatusRequest,
            VendorStatusRequest,
            VendorStatusResponse,
            ProductStatusRequest,
            PopularityRequest,
            FeatureRequest,
            UserList,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<AuthResponse>,
            ApiResponse<Product>,
            ApiResponse<ProductCatalog>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Account", description = "Registration, login and profile"),
        (name = "Catalog", description = "Public categories and approved products"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Vendor", description = "Product management for approved vendors"),
        (name = "Admin", description = "Moderation, categories, accounts and orders"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_router() {
        let spec = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/user/checkout",
            "/api/vendor/add-product",
            "/api/admin/vendor-status",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
