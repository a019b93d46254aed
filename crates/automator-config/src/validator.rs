//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(first) => Err(ConfigError::InvalidValue {
                field: first.path,
                message: first.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_browser(config, &mut result);
        Self::validate_page(config, &mut result);
        Self::validate_jobs(config, &mut result);
        Self::validate_notify(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }

        for origin in &config.server.allowed_origins {
            if origin.contains('*') {
                result.add_error(ValidationError::new(
                    "server.allowed_origins",
                    "Wildcard origins are not allowed; list each origin",
                ));
            } else if !origin.starts_with("http://") && !origin.starts_with("https://") {
                result.add_error(ValidationError::new(
                    "server.allowed_origins",
                    format!("Origin must start with http:// or https://: {}", origin),
                ));
            }
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        let endpoint = &config.browser.cdp_endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            result.add_error(ValidationError::new(
                "browser.cdp_endpoint",
                "cdp_endpoint must start with http:// or https://",
            ));
        }

        if config.browser.page_url_pattern.is_empty() {
            result.add_warning(ValidationWarning::new(
                "browser.page_url_pattern",
                "Empty page_url_pattern matches every tab",
            ));
        }
    }

    fn validate_page(config: &Config, result: &mut ValidationResult) {
        let page = &config.page;
        let polls = [
            ("page.transition_poll_ms", page.transition_poll_ms),
            ("page.video_poll_ms", page.video_poll_ms),
            ("page.thumbnail_poll_ms", page.thumbnail_poll_ms),
        ];
        for (path, value) in polls {
            if value == 0 {
                result.add_error(ValidationError::new(path, "Poll interval must be greater than 0"));
            }
        }

        if page.transition_timeout_ms < page.transition_poll_ms {
            result.add_warning(ValidationWarning::new(
                "page.transition_timeout_ms",
                "Transition timeout is shorter than its poll interval",
            ));
        }

        if !page.selectors.aspect_ratio_button.contains("{ratio}") {
            result.add_error(ValidationError::new(
                "page.selectors.aspect_ratio_button",
                "Selector must contain the {ratio} placeholder",
            ));
        }

        let lists = [
            ("page.selectors.edit_textarea", &page.selectors.edit_textarea),
            ("page.selectors.sidebar", &page.selectors.sidebar),
            ("page.selectors.thumbnail", &page.selectors.thumbnail),
        ];
        for (path, list) in lists {
            if list.is_empty() {
                result.add_error(ValidationError::new(path, "At least one selector is required"));
            }
        }
    }

    fn validate_jobs(config: &Config, result: &mut ValidationResult) {
        if config.media.completion_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "media.completion_timeout_secs",
                "completion_timeout_secs must be greater than 0",
            ));
        }

        if config.media.output_folder.trim().is_empty() {
            result.add_error(ValidationError::new(
                "media.output_folder",
                "Output folder cannot be empty",
            ));
        }

        if config.edit.generation_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "edit.generation_timeout_secs",
                "generation_timeout_secs must be greater than 0",
            ));
        }

        if config.edit.variants_per_prompt == 0 {
            result.add_error(ValidationError::new(
                "edit.variants_per_prompt",
                "variants_per_prompt must be greater than 0",
            ));
        }

        if config.edit.output_folder.trim().is_empty() {
            result.add_error(ValidationError::new(
                "edit.output_folder",
                "Output folder cannot be empty",
            ));
        }

        if config.edit.delay_secs == 0 {
            result.add_warning(ValidationWarning::new(
                "edit.delay_secs",
                "A zero delay submits prompts faster than the generator usually accepts",
            ));
        }
    }

    fn validate_notify(config: &Config, result: &mut ValidationResult) {
        if let Some(ref url) = config.notify.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.add_error(ValidationError::new(
                    "notify.webhook_url",
                    "webhook_url must start with http:// or https://",
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
