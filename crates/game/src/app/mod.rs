pub(crate) mod bootstrap;
mod director;
pub(crate) mod loop_runner;
mod settings;
