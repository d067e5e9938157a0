use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_seconds: u64,
}

/// Argon2 parameters. `cost` is the time cost (iterations).
#[derive(Debug, Clone, Copy)]
pub struct HashConfig {
    pub cost: u32,
    pub memory_kib: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            cost: 10,
            memory_kib: argon2::Params::DEFAULT_M_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_base: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_connect_attempts: u32,
    pub jwt: JwtConfig,
    pub hash: HashConfig,
    pub github: GithubConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "devconnect".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "devconnect-users".into()),
            ttl_seconds: env_parse("JWT_TTL_SECONDS").unwrap_or(360_000),
        };
        let defaults = HashConfig::default();
        let hash = HashConfig {
            cost: env_parse("HASH_COST").unwrap_or(defaults.cost),
            memory_kib: env_parse("HASH_MEMORY_KIB").unwrap_or(defaults.memory_kib),
        };
        let github = GithubConfig {
            api_base: std::env::var("GITHUB_API_BASE")
                .unwrap_or_else(|_| "https://api.github.com".into()),
            client_id: std::env::var("GITHUB_CLIENT_ID").ok(),
            client_secret: std::env::var("GITHUB_CLIENT_SECRET").ok(),
        };
        Ok(Self {
            database_url,
            db_connect_attempts: env_parse("DATABASE_CONNECT_ATTEMPTS").unwrap_or(5),
            jwt,
            hash,
            github,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
