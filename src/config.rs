use anyhow::Context;

/// Process configuration, read from the environment once at startup.
///
/// Both values are required: a missing `DATABASE_URL` or `JWT_SECRET` is a
/// deployment fault, so the process refuses to start rather than failing on
/// the first request that needs them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        Ok(Self {
            database_url,
            jwt_secret,
        })
    }
}
