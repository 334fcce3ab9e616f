//now people using the types library can use these types
pub mod events;
pub mod question;

//re-export types for easier access
pub use events::{ClientEvent, ServerEvent};
pub use question::{Question, SessionConfig};
