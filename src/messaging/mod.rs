// Messaging - Lock-free UI <-> scheduler communication

pub mod channels;
pub mod command;
pub mod notification;
