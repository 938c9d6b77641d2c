//! Webhook signature middleware.
//!
//! The payment gateway signs every webhook delivery with an HMAC-SHA256 over the raw
//! request body, delivered in a header. Verification must run against the *exact*
//! unparsed bytes: the JSON extractor further down the chain would re-serialize
//! differently, so this middleware captures the payload first, checks the signature, and
//! then restores the payload for the handler.
//!
//! A missing or mismatched signature is a permanent 400; the gateway's retry machinery
//! must not retry it.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use gateway_tools::helpers::calculate_hmac;
use log::{trace, warn};
use ros_common::Secret;

use crate::errors::ServerError;

pub struct SignatureMiddlewareFactory {
    signature_header: String,
    secret: Secret<String>,
}

impl SignatureMiddlewareFactory {
    pub fn new(signature_header: &str, secret: Secret<String>) -> Self {
        SignatureMiddlewareFactory { signature_header: signature_header.into(), secret }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SignatureMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = SignatureMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignatureMiddlewareService {
            signature_header: self.signature_header.clone(),
            secret: self.secret.clone(),
            service: Rc::new(service),
        }))
    }
}

pub struct SignatureMiddlewareService<S> {
    signature_header: String,
    secret: Secret<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SignatureMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.secret.reveal().clone();
        let signature_header = self.signature_header.clone();
        Box::pin(async move {
            trace!("🔐️ Checking webhook signature for request");
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {e:?}");
                Error::from(ServerError::InvalidRequestBody("Failed to read request body".to_string()))
            })?;
            let signature = req.headers().get(&signature_header).ok_or_else(|| {
                warn!("🔐️ No signature found in webhook request. Denying access.");
                Error::from(ServerError::InvalidSignature)
            })?;
            let expected = calculate_hmac(&secret, data.as_ref());
            if signature == expected.as_str() {
                trace!("🔐️ Webhook signature check ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Invalid signature found in webhook request. Denying access.");
                Err(ServerError::InvalidSignature.into())
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
