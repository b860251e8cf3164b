pub mod openai;
pub mod text_analyzer;
