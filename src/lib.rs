pub mod client;
pub mod csvio;
pub mod errors;
pub mod processor;
pub mod record;
pub mod response;
pub mod search_key;
