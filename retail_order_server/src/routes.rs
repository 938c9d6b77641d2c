//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this
//! module neat and tidy 🙏
//!
//! Handlers are generic over the storage backend, which actix-web cannot register
//! directly, so each route is registered through the `route!` macro below.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use retail_order_engine::{
    db_types::{LineItemRequest, NewOrder, OrderId, OrderUpdate, Role},
    InventoryManagement,
    OrderFlowApi,
    OrderManagement,
};

use crate::{
    auth::AuthenticatedUser,
    data_objects::{CreateOrderRequest, UpdateOrderRequest},
    errors::ServerError,
};

// Actix-web cannot handle generics in handlers, so registration is implemented manually
// via the `route!` macro.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl InventoryManagement, OrderManagement);
/// Places a new order for the authenticated user.
///
/// Stock for every line item is reserved atomically; the response is 201 with the stored
/// order, or 400 when validation fails or any item cannot be satisfied. Quantities are
/// taken from the request, but names and prices are snapshotted server-side.
pub async fn create_order<A>(
    user: AuthenticatedUser,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: InventoryManagement + OrderManagement,
{
    let request = body.into_inner();
    debug!("💻️ POST order for user {} with {} items", user.user_id, request.order_items.len());
    let items = request
        .order_items
        .into_iter()
        .map(|i| LineItemRequest::new(i.product, i.quantity))
        .collect::<Vec<_>>();
    let mut order = NewOrder::new(user.user_id, items, request.shipping_address, request.total_price);
    if let Some(method) = request.payment_method {
        order = order.with_payment_method(method);
    }
    let order = api.create_order(order).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders" impl InventoryManagement, OrderManagement);
pub async fn my_orders<A>(
    user: AuthenticatedUser,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: InventoryManagement + OrderManagement,
{
    debug!("💻️ GET orders for user {}", user.user_id);
    let orders = api.orders_for_user(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(all_orders => Get "/orders/all" impl InventoryManagement, OrderManagement where requires [Role::Admin]);
pub async fn all_orders<A>(api: web::Data<OrderFlowApi<A>>) -> Result<HttpResponse, ServerError>
where A: InventoryManagement + OrderManagement
{
    debug!("💻️ GET all orders");
    let orders = api.all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_order => Put "/orders/{id}" impl InventoryManagement, OrderManagement where requires [Role::Admin]);
/// Administrative status/payment correction. Bypasses the payment gateway flow and never
/// touches inventory.
pub async fn update_order<A>(
    path: web::Path<String>,
    body: web::Json<UpdateOrderRequest>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: InventoryManagement + OrderManagement,
{
    let order_id = OrderId(path.into_inner());
    let request = body.into_inner();
    debug!("💻️ PUT order {order_id}: paid {:?}, status {:?}", request.is_paid, request.status);
    let update = OrderUpdate { status: request.status, is_paid: request.is_paid, paid_at: None };
    let order = api.admin_update_order(&order_id, update).await?;
    Ok(HttpResponse::Ok().json(order))
}
