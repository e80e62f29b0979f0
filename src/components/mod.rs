pub mod filter_panel;
pub mod legend;
pub mod network;
