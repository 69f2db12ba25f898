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

/// 요청 로깅 + 카운터 미들웨어
/// 모든 요청을 세고, 요청과 응답의 세부 정보를 로깅합니다.
pub struct LoggerMiddleware {
    request_count: Arc<AtomicU64>,
}

impl LoggerMiddleware {
    pub fn new(request_count: Arc<AtomicU64>) -> Self {
        Self { request_count }
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
            request_count: self.request_count.clone(),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
    request_count: Arc<AtomicU64>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
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
        let method = req.method().to_string();
        let path = req.path().to_string();

        self.request_count.fetch_add(1, Ordering::Relaxed);

        // 요청 정보 로깅 (Authorization 헤더는 절대 남기지 않음)
        info!("Request started: {} {}", method, path);

        let service = self.service.clone();

        Box::pin(async move {
            let res = service.call(req).await?;

            let elapsed = start_time.elapsed();

            // 응답 정보 로깅
            info!(
                "Request completed: {} {} - Status: {} ({}ms)",
                method,
                path,
                res.status().as_u16(),
                elapsed.as_millis()
            );

            Ok(res)
        })
    }
}
