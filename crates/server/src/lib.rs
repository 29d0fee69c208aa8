pub mod config;
pub mod dispatch;
pub mod rest;
pub mod run;
pub mod shutdown;
pub mod ticker;
