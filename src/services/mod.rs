pub mod blob;
pub mod collection;
pub mod geocode;
