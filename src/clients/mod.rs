pub mod coingecko;
pub mod groq;
