//! Cart routes.
//!
//! All cart operations are lenient: quantities get clamped to current stock and unknown
//! products are dropped (or 404 where the client named one specifically); the response
//! is always the corrected cart.

use actix_web::{web, HttpResponse};
use log::*;
use retail_order_engine::{
    db_types::{NewCartItem, ProductId},
    CartApi,
    CartManagement,
    InventoryManagement,
};

use crate::{
    auth::AuthenticatedUser,
    data_objects::{CartItemRequest, CartItemsRequest, UpdateCartItemRequest},
    errors::ServerError,
    route,
};

route!(my_cart => Get "/cart" impl CartManagement, InventoryManagement);
pub async fn my_cart<A>(
    user: AuthenticatedUser,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: CartManagement + InventoryManagement,
{
    debug!("💻️ GET cart for user {}", user.user_id);
    let cart = api.cart(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(save_cart => Post "/cart" impl CartManagement, InventoryManagement);
pub async fn save_cart<A>(
    user: AuthenticatedUser,
    body: web::Json<CartItemsRequest>,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: CartManagement + InventoryManagement,
{
    debug!("💻️ POST cart for user {}", user.user_id);
    let items = body.into_inner().items.into_iter().map(NewCartItem::from).collect();
    let cart = api.save_cart(&user.user_id, items).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(add_cart_item => Post "/cart/items" impl CartManagement, InventoryManagement);
pub async fn add_cart_item<A>(
    user: AuthenticatedUser,
    body: web::Json<CartItemRequest>,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: CartManagement + InventoryManagement,
{
    let item = NewCartItem::from(body.into_inner());
    debug!("💻️ POST cart item {} for user {}", item.product_id, user.user_id);
    let cart = api.add_item(&user.user_id, item).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(update_cart_item => Put "/cart/items/{productId}" impl CartManagement, InventoryManagement);
pub async fn update_cart_item<A>(
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<UpdateCartItemRequest>,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: CartManagement + InventoryManagement,
{
    let product_id = ProductId(path.into_inner());
    debug!("💻️ PUT cart item {product_id} for user {}", user.user_id);
    let cart = api.update_item(&user.user_id, &product_id, body.into_inner().quantity).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(remove_cart_item => Delete "/cart/items/{productId}" impl CartManagement, InventoryManagement);
pub async fn remove_cart_item<A>(
    user: AuthenticatedUser,
    path: web::Path<String>,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: CartManagement + InventoryManagement,
{
    let product_id = ProductId(path.into_inner());
    debug!("💻️ DELETE cart item {product_id} for user {}", user.user_id);
    let cart = api.remove_item(&user.user_id, &product_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(clear_cart => Delete "/cart" impl CartManagement, InventoryManagement);
pub async fn clear_cart<A>(
    user: AuthenticatedUser,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: CartManagement + InventoryManagement,
{
    debug!("💻️ DELETE cart for user {}", user.user_id);
    let cart = api.clear(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(merge_cart => Post "/cart/merge" impl CartManagement, InventoryManagement);
pub async fn merge_cart<A>(
    user: AuthenticatedUser,
    body: web::Json<CartItemsRequest>,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: CartManagement + InventoryManagement,
{
    debug!("💻️ POST merge guest cart for user {}", user.user_id);
    let items = body.into_inner().items.into_iter().map(NewCartItem::from).collect();
    let cart = api.merge_guest_cart(&user.user_id, items).await?;
    Ok(HttpResponse::Ok().json(cart))
}
