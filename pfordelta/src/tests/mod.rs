mod container;
mod scenarios;
mod utils;
