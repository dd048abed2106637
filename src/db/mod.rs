pub mod database;
pub(crate) mod null_bitmap;
pub mod table;
