use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Tunables for the allergen reports.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// How many potential allergens the dashboard shows.
    pub potential_limit: usize,
    /// Days before expiration at which an EpiPen starts to need a reminder.
    pub epipen_reminder_days: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            potential_limit: 5,
            epipen_reminder_days: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "derme".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "derme-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };
        let defaults = AnalysisConfig::default();
        let analysis = AnalysisConfig {
            potential_limit: env_parse("POTENTIAL_ALLERGEN_LIMIT").unwrap_or(defaults.potential_limit),
            epipen_reminder_days: env_parse("EPIPEN_REMINDER_DAYS")
                .unwrap_or(defaults.epipen_reminder_days),
        };
        Ok(Self {
            database_url,
            jwt,
            analysis,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_defaults() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.potential_limit, 5);
        assert_eq!(cfg.epipen_reminder_days, 30);
    }

    #[test]
    fn env_parse_ignores_garbage() {
        std::env::set_var("DERME_TEST_NUMBER", "not-a-number");
        assert_eq!(env_parse::<i64>("DERME_TEST_NUMBER"), None);
        std::env::set_var("DERME_TEST_NUMBER", "42");
        assert_eq!(env_parse::<i64>("DERME_TEST_NUMBER"), Some(42));
        assert_eq!(env_parse::<i64>("DERME_TEST_MISSING_KEY"), None);
    }
}
