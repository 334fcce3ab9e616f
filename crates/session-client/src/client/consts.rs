pub const DEFAULT_URL: &str = "ws://127.0.0.1:5000/ws";
pub const DEFAULT_CAPACITY: usize = 1024;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
