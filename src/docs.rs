use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use warehouse_core::{PaginationMeta, PaginationParams};
use warehouse_models::{
    CreatePermissionDto, CreateProductDto, CreateRoleDto, CreateStockInDto, CreateStockOutDto,
    CreateUserDto, GenerateSnapshotsDto, GenerateSnapshotsResponse, InventorySnapshot,
    LoginRequest, LoginResponse, PaginatedPermissionsResponse, PaginatedProductsResponse,
    PaginatedStockFormsResponse, PaginatedUsersResponse, Permission, Product, ProfileResponse,
    Role, RoleWithPermissions, SetRolePermissionsDto, StockForm, StockFormItem,
    StockFormWithItems, StockLineDto, UpdatePermissionDto, UpdateProductDto, UpdateRoleDto,
    UpdateUserDto, User,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_profile,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::roles::controller::get_roles,
        crate::modules::roles::controller::get_role,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::update_role,
        crate::modules::roles::controller::delete_role,
        crate::modules::roles::controller::set_role_permissions,
        crate::modules::permissions::controller::get_permissions,
        crate::modules::permissions::controller::get_permission,
        crate::modules::permissions::controller::create_permission,
        crate::modules::permissions::controller::update_permission,
        crate::modules::permissions::controller::delete_permission,
        crate::modules::products::controller::get_products,
        crate::modules::products::controller::get_product,
        crate::modules::products::controller::create_product,
        crate::modules::products::controller::update_product,
        crate::modules::products::controller::delete_product,
        crate::modules::stock::controller::create_stock_in,
        crate::modules::stock::controller::get_stock_in_forms,
        crate::modules::stock::controller::get_stock_in_form,
        crate::modules::stock::controller::create_stock_out,
        crate::modules::stock::controller::get_stock_out_forms,
        crate::modules::stock::controller::get_stock_out_form,
        crate::modules::inventory::controller::generate_snapshots,
        crate::modules::inventory::controller::get_snapshots,
    ),
    components(
        schemas(
            ErrorResponse,
            LoginRequest,
            LoginResponse,
            ProfileResponse,
            User,
            CreateUserDto,
            UpdateUserDto,
            PaginatedUsersResponse,
            Role,
            RoleWithPermissions,
            CreateRoleDto,
            UpdateRoleDto,
            SetRolePermissionsDto,
            Permission,
            CreatePermissionDto,
            UpdatePermissionDto,
            PaginatedPermissionsResponse,
            Product,
            CreateProductDto,
            UpdateProductDto,
            PaginatedProductsResponse,
            StockLineDto,
            CreateStockInDto,
            CreateStockOutDto,
            StockForm,
            StockFormItem,
            StockFormWithItems,
            PaginatedStockFormsResponse,
            InventorySnapshot,
            GenerateSnapshotsDto,
            GenerateSnapshotsResponse,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and caller profile"),
        (name = "Users", description = "User administration"),
        (name = "Roles", description = "Roles and their permission sets"),
        (name = "Permissions", description = "Endpoint permission records"),
        (name = "Products", description = "Product catalogue"),
        (name = "Stock", description = "Stock-in and stock-out forms"),
        (name = "Inventory", description = "Monthly inventory snapshots")
    ),
    info(
        title = "Warehouse API",
        version = "0.1.0",
        description = "Warehouse management REST API built with Rust, Axum, and PostgreSQL, with per-endpoint role permissions.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_protected_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/admin/users/{id}",
            "/api/admin/roles/{id}/permissions",
            "/api/products/{productCode}",
            "/api/stock-out",
            "/api/inventory/snapshots",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
