pub mod cleaner;
pub mod pipeline;
pub mod simulator;
pub mod static_data;
pub mod tiles;
pub mod visualiser;
