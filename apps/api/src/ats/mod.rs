//! Resume upload endpoints: extract text from a file and optionally score it.

pub mod handlers;
