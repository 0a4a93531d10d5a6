//! # Warehouse Models
//!
//! Database rows, request/response DTOs and their validation rules.
//!
//! - [`auth`]: login request/response and the caller's profile
//! - [`users`]: accounts and their single role
//! - [`roles`]: roles and their permission sets
//! - [`permissions`]: `(api_path, http_method)` permission records
//! - [`products`]: the product catalogue
//! - [`stock`]: stock-in and stock-out forms with line items
//! - [`inventory`]: monthly per-product balances

pub mod auth;
pub mod inventory;
pub mod permissions;
pub mod products;
pub mod roles;
pub mod stock;
pub mod users;

pub use auth::{LoginRequest, LoginResponse, ProfileResponse};
pub use inventory::{
    GenerateSnapshotsDto, GenerateSnapshotsResponse, InventorySnapshot, SnapshotBalance,
    SnapshotQuery,
};
pub use permissions::{
    CreatePermissionDto, PaginatedPermissionsResponse, Permission, PermissionFilterParams,
    UpdatePermissionDto,
};
pub use products::{
    CreateProductDto, PaginatedProductsResponse, Product, ProductFilterParams, UpdateProductDto,
};
pub use roles::{CreateRoleDto, Role, RoleWithPermissions, SetRolePermissionsDto, UpdateRoleDto};
pub use stock::{
    CreateStockInDto, CreateStockOutDto, NewStockForm, PaginatedStockFormsResponse, StockDirection,
    StockForm, StockFormItem, StockFormWithItems, StockLineDto,
};
pub use users::{CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams};
