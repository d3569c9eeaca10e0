use crate::config::AppConfig;
use crate::error::Result;
use crate::services::agents::{PredictorAgent, RetrieverAgent};
use crate::services::chatbot::{DogBreedChatbot, DEFAULT_MESSAGE};
use crate::services::classifier::model_manager::ModelManager;
use crate::services::llm::{ChatCompletionsClient, LlmClient};
use crate::services::retriever::WebRetriever;
use crate::services::tools::{PawPredictorTool, PawRetrieverTool, ToolRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

const IMAGE_PROMPT: &str = "What breed is this dog?";

#[derive(Debug, PartialEq)]
pub enum ChatInput {
    Empty,
    Quit,
    Message { text: String, image: Option<PathBuf> },
}

/// `/image <path> [message]` attaches a photo; `/quit` or `/exit` ends the session.
pub fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if line == "/quit" || line == "/exit" {
        return ChatInput::Quit;
    }
    if let Some(rest) = line.strip_prefix("/image") {
        let rest = rest.trim_start();
        let (path, text) = match rest.split_once(char::is_whitespace) {
            Some((path, text)) => (path, text.trim()),
            None => (rest, ""),
        };
        if !path.is_empty() {
            let text = if text.is_empty() { IMAGE_PROMPT } else { text };
            return ChatInput::Message {
                text: text.to_string(),
                image: Some(PathBuf::from(path)),
            };
        }
    }
    ChatInput::Message {
        text: line.to_string(),
        image: None,
    }
}

pub async fn build_chatbot(config: &AppConfig) -> Result<DogBreedChatbot> {
    let api_key = config.require_api_key()?;
    let llm: Arc<dyn LlmClient> = Arc::new(ChatCompletionsClient::new(&config.llm, api_key)?);

    let predictor = ModelManager::new(config.model.clone())
        .load(config.decision.clone())
        .await?;
    let retriever = Arc::new(WebRetriever::new(&config.retriever)?);

    let registry = ToolRegistry::new()
        .with_tool(Arc::new(PawPredictorTool::new(predictor)))
        .with_tool(Arc::new(PawRetrieverTool::new(retriever)));
    debug!(count = registry.names().count(), "tools registered:\n{}", registry.describe());

    Ok(DogBreedChatbot::new(
        PredictorAgent::from_registry(&registry)?,
        RetrieverAgent::from_registry(&registry, Some(llm))?,
    ))
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut chatbot = build_chatbot(config).await?;
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(format!("{}\n(/image <path> [message] to upload, /quit to leave)\n\n> ", DEFAULT_MESSAGE).as_bytes())
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let reply = match parse_input(&line) {
            ChatInput::Quit => break,
            ChatInput::Empty => None,
            ChatInput::Message { text, image } => Some(chatbot.process_message(&text, image.as_deref()).await),
        };
        if let Some(reply) = reply {
            stdout.write_all(format!("\n{}\n\n", reply).as_bytes()).await?;
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    debug!(turns = chatbot.context().history.len(), "chat session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            parse_input("  tell me more  "),
            ChatInput::Message {
                text: "tell me more".into(),
                image: None
            }
        );
    }

    #[test]
    fn image_command_attaches_path_and_default_prompt() {
        assert_eq!(
            parse_input("/image ./dog.jpg"),
            ChatInput::Message {
                text: IMAGE_PROMPT.into(),
                image: Some(PathBuf::from("./dog.jpg"))
            }
        );
    }

    #[test]
    fn image_command_keeps_trailing_message() {
        assert_eq!(
            parse_input("/image dog.png tell me about this breed"),
            ChatInput::Message {
                text: "tell me about this breed".into(),
                image: Some(PathBuf::from("dog.png"))
            }
        );
    }

    #[test]
    fn bare_image_command_is_plain_text() {
        assert_eq!(
            parse_input("/image"),
            ChatInput::Message {
                text: "/image".into(),
                image: None
            }
        );
    }

    #[test]
    fn quit_and_blank_lines() {
        assert_eq!(parse_input("/quit"), ChatInput::Quit);
        assert_eq!(parse_input("/exit"), ChatInput::Quit);
        assert_eq!(parse_input("   "), ChatInput::Empty);
    }

    #[tokio::test]
    async fn chat_requires_an_api_key() {
        let err = build_chatbot(&AppConfig::default()).await.err().unwrap();
        assert!(matches!(err, crate::error::AppError::Configuration(_)));
    }
}
