pub mod breed_info_types;
pub mod chat_types;
pub mod classify_types;
