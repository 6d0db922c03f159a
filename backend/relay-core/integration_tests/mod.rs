mod client;
mod end_to_end;
mod error;
mod health;
mod helpers;
mod server;
