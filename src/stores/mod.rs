pub mod settings;
pub mod watchlist;
