mod client;
mod controller;
mod scheduler;
mod service;
mod util;

pub use util::TestContextExt;
