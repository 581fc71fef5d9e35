pub mod cms;
pub mod content;
pub mod credentials;
pub mod error;
pub mod images;
pub mod oauth1;
pub mod twitter;
