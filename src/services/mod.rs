pub mod agents;
pub mod breed_name;
pub mod chatbot;
pub mod classifier;
pub mod llm;
pub mod retriever;
pub mod tools;
