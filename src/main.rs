use std::net::TcpListener;
use std::sync::Arc;

use chirpy::auth::SessionManager;
use chirpy::configuration::get_configuration;
use chirpy::startup::run;
use chirpy::state::AppState;
use chirpy::store::{PostgresRefreshTokenStore, PostgresUserStore};
use chirpy::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // 구조화된 로깅 초기화
    init_telemetry();

    tracing::info!("Starting application");

    // 설정 로드
    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error"
            ));
        }
    };

    // 데이터베이스 연결 풀 생성
    let connection_string = configuration.database.connection_string();
    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error"
            )
        })?;

    tracing::info!("Database connection pool created successfully");

    // 세션 관리자 구성
    let sessions = SessionManager::new(
        Arc::new(PostgresUserStore::new(pool.clone())),
        Arc::new(PostgresRefreshTokenStore::new(pool)),
        configuration.jwt.secret,
    );
    let state = AppState::new(sessions, configuration.polka.api_key.clone());

    // 서버 주소 설정
    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    tracing::info!("Binding server to address: {}", address);

    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    // 서버 실행
    let server = run(listener, state)?;
    tracing::info!("Server started successfully");

    server.await
}
