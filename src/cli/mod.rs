pub mod config_cmd;
pub mod logging;
pub mod output;
pub mod renderer;
pub mod run_cmd;
