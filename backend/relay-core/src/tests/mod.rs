mod config;
mod connection;
mod events;
mod log_writer;
mod wire;
