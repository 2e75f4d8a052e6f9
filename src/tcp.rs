pub mod config;
pub mod message;
pub mod receiver;
pub mod sender;
pub mod seqno;
