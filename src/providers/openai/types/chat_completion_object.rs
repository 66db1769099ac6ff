use super::message::{FinishReason, Message};
use super::shared::Usage;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ChatCompletionObject<'a> {
    #[serde(default)]
    pub id: String,
    pub model: String,
    pub choices: Vec<Choice<'a>>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice<'a> {
    pub finish_reason: Option<FinishReason>,
    #[serde(default)]
    pub index: u32,
    pub message: Message<'a>,
}
