use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use log::info;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Process-wide count of requests served by the static file server
#[derive(Debug, Default)]
pub struct FileserverHits(AtomicU64);

impl FileserverHits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Counts and logs every request passing through the wrapped service
pub struct HitCounterMiddleware {
    hits: Arc<FileserverHits>,
}

impl HitCounterMiddleware {
    pub fn new(hits: Arc<FileserverHits>) -> Self {
        Self { hits }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HitCounterMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HitCounterMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(HitCounterMiddlewareService {
            service: Rc::new(service),
            hits: self.hits.clone(),
        }))
    }
}

pub struct HitCounterMiddlewareService<S> {
    service: Rc<S>,
    hits: Arc<FileserverHits>,
}

impl<S, B> Service<ServiceRequest> for HitCounterMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let path = req.path().to_string();
        let count = self.hits.increment();

        let service = self.service.clone();

        Box::pin(async move {
            let res = service.call(req).await?;

            info!(
                "Fileserver hit #{}: {} - Status: {} ({}ms)",
                count,
                path,
                res.status().as_u16(),
                start_time.elapsed().as_millis()
            );

            Ok(res)
        })
    }
}
