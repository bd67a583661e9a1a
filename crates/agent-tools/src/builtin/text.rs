//! Small text utilities

use crate::Tool;
use agent_core::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

fn parse<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T> {
    serde_json::from_value(params)
        .map_err(|e| Error::InvalidInput(format!("Invalid parameters: {e}")))
}

fn text_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "text": { "type": "string", "description": description }
        },
        "required": ["text"]
    })
}

#[derive(Debug, Deserialize)]
struct TextParams {
    text: String,
}

#[derive(Debug, Deserialize)]
struct LetterParams {
    word: String,
    letter: String,
}

/// Counts occurrences of one letter in a word, ignoring case
#[derive(Debug, Clone, Copy, Default)]
pub struct LetterCounterTool;

/// Case-insensitive count of `letter` in `word`
///
/// Fails unless `letter` is exactly one character.
pub fn count_letter(word: &str, letter: &str) -> Result<usize> {
    let mut chars = letter.chars();
    let (Some(wanted), None) = (chars.next(), chars.next()) else {
        return Err(Error::InvalidInput(
            "The 'letter' parameter must be a single character".to_string(),
        ));
    };
    let wanted: String = wanted.to_lowercase().collect();
    Ok(word.to_lowercase().matches(wanted.as_str()).count())
}

#[async_trait]
impl Tool for LetterCounterTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: LetterParams = parse(params)?;
        let count = count_letter(&params.word, &params.letter)?;
        Ok(json!(count))
    }

    fn name(&self) -> &str {
        "letter_counter"
    }

    fn description(&self) -> &str {
        "Count occurrences of a specific letter in a word (case-insensitive)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "word": { "type": "string", "description": "The input word to search in" },
                "letter": { "type": "string", "description": "The single letter to count" }
            },
            "required": ["word", "letter"]
        })
    }
}

/// Reverses the characters of a text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReverserTool;

#[async_trait]
impl Tool for TextReverserTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: TextParams = parse(params)?;
        Ok(json!(params.text.chars().rev().collect::<String>()))
    }

    fn name(&self) -> &str {
        "text_reverser"
    }

    fn description(&self) -> &str {
        "Reverse the order of characters in text."
    }

    fn input_schema(&self) -> Value {
        text_schema("Text to reverse")
    }
}

/// Counts whitespace-separated words
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCounterTool;

#[async_trait]
impl Tool for WordCounterTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: TextParams = parse(params)?;
        Ok(json!(params.text.split_whitespace().count()))
    }

    fn name(&self) -> &str {
        "word_counter"
    }

    fn description(&self) -> &str {
        "Count the number of words in text."
    }

    fn input_schema(&self) -> Value {
        text_schema("Text to count words in")
    }
}
