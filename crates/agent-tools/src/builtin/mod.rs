//! Built-in workshop tools

pub mod calculator;
pub mod text;
pub mod time;

pub use calculator::CalculatorTool;
pub use text::{LetterCounterTool, TextReverserTool, WordCounterTool};
pub use time::CurrentTimeTool;

use crate::ToolRegistry;
use std::sync::Arc;

/// Register every built-in tool with `registry`
pub fn register_all(registry: &ToolRegistry) {
    registry.register(Arc::new(CalculatorTool));
    registry.register(Arc::new(CurrentTimeTool::new()));
    registry.register(Arc::new(LetterCounterTool));
    registry.register(Arc::new(TextReverserTool));
    registry.register(Arc::new(WordCounterTool));
}
