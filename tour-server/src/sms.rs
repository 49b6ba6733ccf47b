//! Outbound SMS gateway client and message templating

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};

use crate::config::Config;
use crate::error::ServiceResult;

/// Days until the next reminder when no schedule date is supplied.
pub const DEFAULT_REMINDER_INTERVAL_DAYS: i64 = 7;

/// Client for the SMS gateway (Ping4SMS-style HTTP GET API).
#[derive(Clone)]
pub struct SmsClient {
    http: reqwest::Client,
    api_url: String,
    key: String,
    route: String,
    sender: String,
    template_id: String,
}

impl SmsClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.sms_api_url.clone(),
            key: config.sms_account_key.clone(),
            route: config.sms_route.clone(),
            sender: config.sms_sender.clone(),
            template_id: config.sms_template_id.clone(),
        }
    }

    /// Send one SMS. The gateway reports failure either as a non-2xx status
    /// or as an error body, both surface as `SmsGatewayFailed`.
    pub async fn send(&self, number: &str, message: &str) -> ServiceResult<()> {
        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("key", self.key.as_str()),
                ("route", self.route.as_str()),
                ("sender", self.sender.as_str()),
                ("number", number),
                ("sms", message),
                ("templateid", self.template_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, number, "SMS gateway request failed");
                AppError::new(ErrorCode::SmsGatewayFailed)
            })?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), number, "SMS gateway rejected message");
            return Err(AppError::new(ErrorCode::SmsGatewayFailed).into());
        }

        tracing::info!(number, "SMS sent");
        Ok(())
    }
}

/// Render a `{{placeholder}}` template against a value map. Unknown
/// placeholders are left as-is so a bad template is visible in the message.
pub fn render_template(template: &str, values: &HashMap<&str, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

/// Next reminder timestamp when the caller did not schedule one:
/// now plus [`DEFAULT_REMINDER_INTERVAL_DAYS`].
pub fn default_next_reminder(now_millis: i64) -> i64 {
    now_millis + DEFAULT_REMINDER_INTERVAL_DAYS * 24 * 60 * 60 * 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_substituted() {
        let mut values = HashMap::new();
        values.insert("name", "Asha".to_string());
        values.insert("dueAmount", "1500".to_string());
        let msg = render_template(
            "Dear {{name}}, your due amount is Rs.{{dueAmount}}.",
            &values,
        );
        assert_eq!(msg, "Dear Asha, your due amount is Rs.1500.");
    }

    #[test]
    fn repeated_placeholder_substituted_everywhere() {
        let mut values = HashMap::new();
        values.insert("name", "Asha".to_string());
        let msg = render_template("{{name}} {{name}}", &values);
        assert_eq!(msg, "Asha Asha");
    }

    #[test]
    fn unknown_placeholder_left_intact() {
        let values = HashMap::new();
        let msg = render_template("Hi {{name}}", &values);
        assert_eq!(msg, "Hi {{name}}");
    }

    #[test]
    fn default_reminder_is_seven_days_out() {
        let now = 1_700_000_000_000;
        assert_eq!(default_next_reminder(now), now + 604_800_000);
    }
}
