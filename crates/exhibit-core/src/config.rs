//! Build-environment dependent settings.

/// Development builds go through the dev server's proxy to avoid CORS.
pub const DEV_PROXY_ORIGIN: &str = "/proxy";
pub const PRODUCTION_ORIGIN: &str = "https://00224466.xyz";
pub const API_PREFIX: &str = "/narrenhaeusel/api";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn log_level(self) -> log::Level {
        match self {
            Environment::Development => log::Level::Debug,
            Environment::Production => log::Level::Info,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    origin: String,
    prefix: String,
}

impl ApiConfig {
    pub fn for_environment(env: Environment) -> Self {
        let origin = match env {
            Environment::Development => DEV_PROXY_ORIGIN,
            Environment::Production => PRODUCTION_ORIGIN,
        };
        Self::with_origin(origin)
    }

    pub fn with_origin(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_owned(),
            prefix: API_PREFIX.to_owned(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}/{}", self.origin, self.prefix, path)
    }

    pub fn login_url(&self) -> String {
        self.endpoint("cms-login")
    }

    pub fn data_url(&self) -> String {
        self.endpoint("get-data")
    }

    pub fn save_url(&self) -> String {
        self.endpoint("save")
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::for_environment(Environment::current())
    }
}

const MOBILE_UA_TOKENS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Whether the browser should be treated as touch-first (shows the pan slider).
pub fn is_touch_primary(user_agent: &str, has_touch_events: bool) -> bool {
    if has_touch_events {
        return true;
    }
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_UA_TOKENS.iter().any(|t| ua.contains(t))
}
