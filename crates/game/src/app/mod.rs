mod bootstrap;
mod gameplay;
mod loop_runner;
mod settings;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
