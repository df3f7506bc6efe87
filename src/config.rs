//! Application configuration module
//! Handles environment variable loading, configuration validation, and application settings

use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub stripe: StripeConfig,
    pub email: EmailConfig,
    pub checkout: CheckoutConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone)]
pub enum LogFormat {
    Json,
    Plain,
}

/// Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    /// Publishable key handed to the embedded payment widget. The widget
    /// cannot render without it, so startup logs a warning when absent.
    pub publishable_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// SMTP transport configuration
///
/// Credentials are optional at startup: their absence surfaces as an explicit
/// configuration error when a send is attempted, not as a boot failure.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub operator_email: String,
}

/// Checkout flow configuration
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Public origin the hosted payment widget redirects back to.
    pub public_base_url: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            stripe: StripeConfig::from_env()?,
            email: EmailConfig::from_env()?,
            checkout: CheckoutConfig::from_env()?,
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logging.validate()?;
        self.stripe.validate()?;
        self.email.validate()?;
        self.checkout.validate()?;

        Ok(())
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost,http://127.0.0.1".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue(
                "SERVER_PORT cannot be 0".to_string(),
            ));
        }

        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SERVER_HOST cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

impl StripeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(StripeConfig {
            secret_key: env::var("STRIPE_SECRET_KEY")
                .map_err(|_| ConfigError::MissingVariable("STRIPE_SECRET_KEY".to_string()))?,
            publishable_key: env::var("STRIPE_PUBLISHABLE_KEY").ok(),
            base_url: env::var("STRIPE_BASE_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            timeout_secs: env::var("STRIPE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STRIPE_TIMEOUT_SECS".to_string()))?,
            max_retries: env::var("STRIPE_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STRIPE_MAX_RETRIES".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "STRIPE_SECRET_KEY cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "STRIPE_BASE_URL must be a valid URL".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "STRIPE_TIMEOUT_SECS cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl EmailConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(EmailConfig {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SMTP_PORT".to_string()))?,
            user: env::var("EMAIL_USER").ok(),
            password: env::var("EMAIL_PASSWORD").ok(),
            operator_email: env::var("OPERATOR_EMAIL")
                .unwrap_or_else(|_| "lavenue120@gmail.com".to_string()),
        })
    }

    /// True when the SMTP transport can actually authenticate.
    pub fn is_configured(&self) -> bool {
        matches!((&self.user, &self.password), (Some(u), Some(p)) if !u.is_empty() && !p.is_empty())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SMTP_HOST cannot be empty".to_string(),
            ));
        }

        if self.smtp_port == 0 {
            return Err(ConfigError::InvalidValue(
                "SMTP_PORT cannot be 0".to_string(),
            ));
        }

        if self.operator_email.is_empty() || !self.operator_email.contains('@') {
            return Err(ConfigError::InvalidValue(
                "OPERATOR_EMAIL must be an email address".to_string(),
            ));
        }

        Ok(())
    }
}

impl CheckoutConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(CheckoutConfig {
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map_err(|_| ConfigError::MissingVariable("PUBLIC_BASE_URL".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.public_base_url.starts_with("http://")
            && !self.public_base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue(
                "PUBLIC_BASE_URL must be a valid URL".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_validation() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_allowed_origins: vec!["http://localhost".to_string()],
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_validation() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Invalid port
            cors_allowed_origins: vec![],
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stripe_config_requires_secret_key() {
        let config = StripeConfig {
            secret_key: " ".to_string(),
            publishable_key: None,
            base_url: "https://api.stripe.com".to_string(),
            timeout_secs: 30,
            max_retries: 3,
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_email_config_is_configured() {
        let config = EmailConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            user: Some("shop@example.com".to_string()),
            password: Some("app-password".to_string()),
            operator_email: "lavenue120@gmail.com".to_string(),
        };

        assert!(config.is_configured());
        assert!(config.validate().is_ok());

        let unconfigured = EmailConfig {
            user: None,
            ..config
        };
        assert!(!unconfigured.is_configured());
        // Missing credentials are a send-time error, not a boot failure.
        assert!(unconfigured.validate().is_ok());
    }

    #[test]
    fn test_checkout_config_rejects_non_url() {
        let config = CheckoutConfig {
            public_base_url: "example.com".to_string(),
        };

        assert!(config.validate().is_err());
    }
}
