use chrono_tz::Tz;
use serde_json::from_str;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppResult, Error};
use crate::model::Reminder;
use crate::openai::{reminder_response_format, ChatCompletionRequest, CompletionClient};
use crate::prompt::build_messages;
use crate::utils::image::image_data_url;
use crate::utils::time;

/// Turns a sign photo into a calendar reminder through one model call
pub struct ReminderGenerator {
    client: Arc<dyn CompletionClient>,
    model: String,
    max_tokens: u32,
    timezone: Tz,
}

impl ReminderGenerator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        model: &str,
        max_tokens: u32,
        timezone: Tz,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
            max_tokens,
            timezone,
        }
    }

    pub fn from_config(client: Arc<dyn CompletionClient>, config: &Config) -> Self {
        info!(
            "Using model {} with {} max tokens, anchor dates in {}",
            config.model, config.max_tokens, config.timezone
        );
        Self::new(client, &config.model, config.max_tokens, config.timezone)
    }

    /// Generate a reminder anchored to today's date
    pub async fn generate(&self, base64_image: &str) -> AppResult<Reminder> {
        let today = time::today(self.timezone);
        self.generate_for(base64_image, &today).await
    }

    /// Generate a reminder anchored to the given date
    pub async fn generate_for(&self, base64_image: &str, today: &str) -> AppResult<Reminder> {
        debug!("Anchor date for this request: {}", today);

        let request = self.build_request(base64_image, today)?;
        let content = self.client.complete(&request).await?;

        parse_reminder(&content)
    }

    /// The completion request for an image and anchor date
    pub fn build_request(
        &self,
        base64_image: &str,
        today: &str,
    ) -> AppResult<ChatCompletionRequest> {
        Ok(ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_messages(today, &image_data_url(base64_image)),
            response_format: reminder_response_format()?,
            max_tokens: self.max_tokens,
        })
    }
}

/// Parse the model's structured output into a [`Reminder`]
pub fn parse_reminder(content: &str) -> AppResult<Reminder> {
    match from_str::<Reminder>(content) {
        Ok(reminder) => return Ok(reminder),
        Err(e) => debug!("Response is not bare JSON: {}", e),
    }

    // Fall back to the outermost JSON object in case the model wrapped it
    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if start < end {
            match from_str::<Reminder>(&content[start..=end]) {
                Ok(reminder) => return Ok(reminder),
                Err(e) => error!("Failed to parse JSON object from response: {}", e),
            }
        }
    }

    Err(Error::Serialization(
        "Could not extract a valid reminder from the model response".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::{ContentPart, Role};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedClient {
        reply: String,
        calls: Mutex<Vec<ChatCompletionRequest>>,
    }

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn complete(&self, request: &ChatCompletionRequest) -> AppResult<String> {
            self.calls.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn generator(reply: &str) -> (ReminderGenerator, Arc<CannedClient>) {
        let client = Arc::new(CannedClient {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        });
        let generator = ReminderGenerator::new(
            client.clone(),
            "gpt-4o",
            300,
            chrono_tz::America::New_York,
        );
        (generator, client)
    }

    #[test]
    fn test_build_request() {
        let (generator, _) = generator("{}");
        let request = generator
            .build_request("/9j/4AAQ", "Sunday, October 18, 2026")
            .unwrap();

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.max_tokens, 300);
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].role, Role::User);
        assert_eq!(
            request.messages[2].content[1],
            ContentPart::image("data:image/jpeg;base64,/9j/4AAQ")
        );
        assert_eq!(request.response_format, reminder_response_format().unwrap());
    }

    #[tokio::test]
    async fn test_generate_makes_one_call() {
        let (generator, client) = generator(
            r#"{"timeAndDateFound":true,"calendarFileData":"BEGIN:VCALENDAR\nEND:VCALENDAR"}"#,
        );

        let reminder = generator
            .generate_for("/9j/4AAQ", "Sunday, October 18, 2026")
            .await
            .unwrap();

        assert!(reminder.time_and_date_found);
        assert_eq!(reminder.calendar_file_data, "BEGIN:VCALENDAR\nEND:VCALENDAR");

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        match &calls[0].messages[2].content[0] {
            ContentPart::Text { text } => assert!(text.contains("Sunday, October 18, 2026")),
            other => panic!("unexpected content part: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_rejects_unstructured_reply() {
        let (generator, _) = generator("Sorry, I cannot read that sign.");
        let result = generator.generate_for("/9j/4AAQ", "Sunday, October 18, 2026").await;
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_parse_reminder_wrapped_in_text() {
        let reminder = parse_reminder(
            "```json\n{\"timeAndDateFound\": false, \"calendarFileData\": \"\"}\n```",
        )
        .unwrap();
        assert!(!reminder.time_and_date_found);
        assert!(reminder.calendar_file_data.is_empty());
    }

    #[test]
    fn test_parse_reminder_missing_field() {
        assert!(parse_reminder(r#"{"timeAndDateFound": true}"#).is_err());
    }
}
