use std::time::Duration;

use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use gateway_tools::{GatewayApi, WEBHOOK_SIGNATURE_HEADER};
use log::info;
use retail_order_engine::{CartApi, OrderFlowApi, PaymentFlowApi, SqliteDatabase};

use crate::{
    cart_routes::{
        AddCartItemRoute,
        ClearCartRoute,
        MergeCartRoute,
        MyCartRoute,
        RemoveCartItemRoute,
        SaveCartRoute,
        UpdateCartItemRoute,
    },
    config::ServerConfig,
    errors::ServerError,
    gateway_routes::{gateway_webhook, CreatePaymentIntentRoute},
    integrations::gateway::GatewayClient,
    middleware::SignatureMiddlewareFactory,
    routes::{health, AllOrdersRoute, CreateOrderRoute, MyOrdersRoute, UpdateOrderRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.database_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway_api =
        GatewayApi::new(config.gateway.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = GatewayClient::new(gateway_api);
    info!("🚀️ Order store ready at {}", config.database_url);
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: GatewayClient,
) -> Result<Server, ServerError> {
    let webhook_secret = config.gateway.webhook_secret.clone();
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let payments_api = PaymentFlowApi::new(db.clone(), gateway.clone());
        let cart_api = CartApi::new(db.clone());
        // The webhook is registered manually: the signature middleware must wrap exactly
        // this route, before any JSON parsing happens, so it can verify the raw bytes.
        let webhook = web::resource("/orders/webhook")
            .wrap(SignatureMiddlewareFactory::new(WEBHOOK_SIGNATURE_HEADER, webhook_secret.clone()))
            .route(web::post().to(gateway_webhook::<SqliteDatabase>));
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ros::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(cart_api))
            .service(health)
            .service(webhook)
            .service(CreatePaymentIntentRoute::<SqliteDatabase>::new())
            .service(AllOrdersRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(UpdateOrderRoute::<SqliteDatabase>::new())
            .service(MyCartRoute::<SqliteDatabase>::new())
            .service(SaveCartRoute::<SqliteDatabase>::new())
            .service(AddCartItemRoute::<SqliteDatabase>::new())
            .service(UpdateCartItemRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
            .service(ClearCartRoute::<SqliteDatabase>::new())
            .service(MergeCartRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
