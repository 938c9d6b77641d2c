use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use retail_order_engine::{
    db_types::{OrderId, ProductId},
    CartError,
    InventoryError,
    OrderApiError,
    PaymentApiError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock { product_id: ProductId, available: i64, requested: i64 },
    #[error("Order {0} has already been paid")]
    AlreadyPaid(OrderId),
    #[error("Invalid webhook signature")]
    InvalidSignature,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The payment gateway could not be reached. Please try again. {0}")]
    PaymentGatewayUnavailable(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::AlreadyPaid(_) => StatusCode::CONFLICT,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::PaymentGatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Business errors carry user-safe messages; anything unexpected is logged with
        // full context and reported generically so internals never leak to clients.
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("💻️ Internal error while handling request: {self}");
            "An internal error occurred. Please try again later.".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": message }).to_string())
    }
}

impl From<InventoryError> for ServerError {
    fn from(e: InventoryError) -> Self {
        match e {
            // During order placement an unknown product is a request problem, not a
            // missing-resource problem, so it maps to 400 with the other validation
            // failures.
            InventoryError::ProductNotFound(_) => Self::ValidationError(e.to_string()),
            InventoryError::InsufficientStock { product_id, available, requested } => {
                Self::InsufficientStock { product_id, available, requested }
            },
            InventoryError::DatabaseError(e) => Self::BackendError(e),
        }
    }
}

impl From<OrderApiError> for ServerError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::DatabaseError(e) => Self::BackendError(e),
            OrderApiError::OrderAlreadyExists(oid) => {
                Self::BackendError(format!("Generated order id {oid} collided"))
            },
            OrderApiError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderApiError::EmptyOrder | OrderApiError::InvalidQuantity { .. } => {
                Self::ValidationError(e.to_string())
            },
            OrderApiError::OrderModificationForbidden { .. } | OrderApiError::PaymentFlagRegression(_) => {
                Self::ValidationError(e.to_string())
            },
            OrderApiError::Inventory(e) => e.into(),
        }
    }
}

impl From<PaymentApiError> for ServerError {
    fn from(e: PaymentApiError) -> Self {
        match e {
            PaymentApiError::DatabaseError(e) => Self::BackendError(e),
            PaymentApiError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            PaymentApiError::AlreadyPaid(oid) => Self::AlreadyPaid(oid),
            PaymentApiError::Gateway(g) => Self::PaymentGatewayUnavailable(g.to_string()),
        }
    }
}

impl From<CartError> for ServerError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::DatabaseError(e) => Self::BackendError(e),
            CartError::ProductNotFound(_) | CartError::CartNotFound(_) | CartError::ItemNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
        }
    }
}
