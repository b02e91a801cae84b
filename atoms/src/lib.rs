pub mod errors;
pub mod images;
pub mod multipart;
pub mod storage;
