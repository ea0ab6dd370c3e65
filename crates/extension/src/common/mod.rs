pub mod net;
pub mod scraping;
