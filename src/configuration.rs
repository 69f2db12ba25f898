use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub polka: PolkaSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Access token signing settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    /// HMAC secret shared by every instance that validates tokens
    pub secret: String,
}

/// Payment provider webhook settings
#[derive(serde::Deserialize, Clone)]
pub struct PolkaSettings {
    pub api_key: String,
}

/// Load settings from `configuration.*` and `APP_` environment variables
///
/// Environment wins, e.g. `APP_JWT__SECRET` overrides `jwt.secret`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;

    if settings.jwt.secret.trim().is_empty() {
        return Err(ConfigError::Message("jwt.secret must not be empty".to_string()));
    }
    if settings.polka.api_key.trim().is_empty() {
        return Err(ConfigError::Message("polka.api_key must not be empty".to_string()));
    }

    Ok(settings)
}
