mod console;
mod error;
mod logger;
