pub mod offline;
pub mod storage;
