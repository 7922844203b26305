pub mod plugins;
pub mod run;
