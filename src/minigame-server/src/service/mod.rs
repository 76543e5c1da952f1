pub mod rules;
pub mod session_socket;
