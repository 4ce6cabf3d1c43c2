use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where route modules live and how their URLs are mounted.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    /// Root directory holding one subdirectory per API version.
    pub dir: String,
    /// Prefix placed before the version segment, e.g. `/api`.
    pub api_base: String,
    pub extensions: Vec<String>,
    pub excludes: Vec<String>,
    pub include_hidden: bool,
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub dir: String,
    pub file_name: String,
    /// Fallback filter when `RUST_LOG` is not set.
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorsConfig {
    /// Allowed origins; `"*"` allows any.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub routes: RoutesConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    pub security: Option<SecurityConfig>,
}

const DEFAULTS: &str = include_str!("../config/default.toml");

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        match ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        // Mirror defaults from config/default.toml
        Self {
            dir: "api".to_string(),
            api_base: "/api".to_string(),
            extensions: vec!["rs".to_string()],
            excludes: Vec::new(),
            include_hidden: false,
            follow_symlinks: false,
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        // Optional local file: pfadfinder.toml (in CWD)
        .add_source(::config::File::with_name("pfadfinder").required(false));

    if let Ok(custom_path) = std::env::var("PFADFINDER_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(
        ::config::Environment::with_prefix("PFADFINDER")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("routes.extensions")
            .with_list_parse_key("routes.excludes")
            .with_list_parse_key("cors.allowed_origins")
            .try_parsing(true),
    );

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    // Warn for privileged ports on Unix-like systems
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    // Routes
    if cfg.routes.dir.trim().is_empty() {
        return Err(anyhow::anyhow!("routes.dir must not be empty"));
    }
    if !cfg.routes.api_base.is_empty() && !cfg.routes.api_base.starts_with('/') {
        return Err(anyhow::anyhow!("routes.api_base must start with '/': {}", cfg.routes.api_base));
    }
    if cfg.routes.extensions.iter().all(|e| e.trim_start_matches('.').is_empty()) {
        return Err(anyhow::anyhow!("routes.extensions must name at least one extension"));
    }

    // Logging
    if cfg.logging.file_name.trim().is_empty() {
        return Err(anyhow::anyhow!("logging.file_name must not be empty"));
    }

    Ok(())
}
