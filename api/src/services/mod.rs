pub mod cache;
pub mod gazetteer;
pub mod geocode;
pub mod insights;
pub mod power;
pub mod synthetic;
pub mod weather;
