use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::prompt::build_prompt;
use super::{parse_task_lines, GenerationError, TaskGenerator};
use crate::config::Config;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct CompletionClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl CompletionClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("no API key configured"))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        }
    }

    /// Sends one request and returns the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .context("Failed to send request to completion endpoint")?
            .error_for_status()
            .context("Completion endpoint returned an error status")?;

        let body: ChatResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        extract_content(body)
    }
}

fn extract_content(body: ChatResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| anyhow!("completion response has no content"))
}

#[async_trait]
impl TaskGenerator for CompletionClient {
    async fn generate(&self, project: &str, ratio: f64) -> Result<Vec<String>, GenerationError> {
        let prompt = build_prompt(project, ratio);
        log::debug!("CompletionClient: requesting tasks from {} ({})", self.base_url, self.model);

        let raw = self.complete(&prompt).await.map_err(|err| {
            log::error!("Error generating todos: {err:#}");
            GenerationError::Failed
        })?;

        let tasks = parse_task_lines(&raw);
        if tasks.is_empty() {
            log::error!("Error generating todos: reply contained no tasks");
            return Err(GenerationError::Failed);
        }
        log::info!("CompletionClient: received {} tasks", tasks.len());
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn client() -> CompletionClient {
        let config = Config {
            api_key: Some("key".to_string()),
            model: "test-model".to_string(),
            ..Config::default()
        };
        CompletionClient::from_config(&config).unwrap()
    }

    /// Serves one canned HTTP/1.1 reply on a local port. The handle yields the
    /// request head that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (Config, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            let head_end = loop {
                let n = socket.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed before request head");
                received.extend_from_slice(&buf[..n]);
                if let Some(pos) = received.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&received[..head_end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while received.len() < head_end + content_length {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }

            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            head
        });

        let config = Config {
            api_key: Some("key".to_string()),
            base_url: format!("http://{addr}"),
            timeout: std::time::Duration::from_secs(5),
            ..Config::default()
        };
        (config, handle)
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(CompletionClient::from_config(&Config::default()).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let client = client();
        let body = serde_json::to_value(client.request_body("do things")).unwrap();
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "do things");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_extract_content() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Write copy\nReview copy\n\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(body).unwrap(), "Write copy\nReview copy\n\n");
    }

    #[test]
    fn test_extract_content_rejects_empty() {
        let no_choices: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(extract_content(no_choices).is_err());

        let missing: ChatResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(extract_content(missing).is_err());

        let null: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(extract_content(null).is_err());

        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":" \n "}}]}"#).unwrap();
        assert!(extract_content(blank).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_opaque_failure() {
        let config = Config {
            api_key: Some("key".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: std::time::Duration::from_secs(2),
            ..Config::default()
        };
        let client = CompletionClient::from_config(&config).unwrap();
        assert_eq!(client.generate("site", 0.5).await, Err(GenerationError::Failed));
    }

    #[tokio::test]
    async fn test_unauthorized_reply_is_failure() {
        let (config, server) = serve_once("401 Unauthorized", r#"{"error":"bad key"}"#).await;
        let client = CompletionClient::from_config(&config).unwrap();

        assert_eq!(client.generate("site", 0.5).await, Err(GenerationError::Failed));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_reply_is_failure() {
        let (config, server) = serve_once("200 OK", "<html>gateway</html>").await;
        let client = CompletionClient::from_config(&config).unwrap();

        assert_eq!(client.generate("site", 0.5).await, Err(GenerationError::Failed));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_reply_lines_become_tasks() {
        let (config, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Write copy\nReview copy\n\n"}}]}"#,
        )
        .await;
        let client = CompletionClient::from_config(&config).unwrap();

        let tasks = client.generate("site", 0.5).await.unwrap();
        assert_eq!(tasks, vec!["Write copy".to_string(), "Review copy".to_string()]);

        let head = server.await.unwrap();
        assert!(head.starts_with("POST /chat/completions HTTP/1.1"));
        assert!(head.to_ascii_lowercase().contains("authorization: bearer key"));
    }
}
