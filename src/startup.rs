use actix_web::dev::Server;
use actix_web::{guard, middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;

use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    health_check, login, metrics, polka_webhook, refresh, register, reset, revoke, update_user,
};
use crate::state::AppState;

pub fn run(
    listener: TcpListener,
    state: AppState,
) -> Result<Server, std::io::Error> {
    let request_count = state.request_count.clone();
    let sessions = state.sessions.clone();
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware::new(request_count.clone()))

            // Shared state
            .app_data(state.clone())

            .route("/api/healthz", web::get().to(health_check))
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))

            // Session flows (refresh/revoke read the refresh token from the bearer header)
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))

            // Protected: requires a valid access token
            .service(
                web::resource("/api/users")
                    .guard(guard::Put())
                    .route(web::put().to(update_user))
                    .wrap(JwtMiddleware::new(sessions.clone())),
            )
            .route("/api/users", web::post().to(register))

            .route("/api/polka/webhooks", web::post().to(polka_webhook))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
