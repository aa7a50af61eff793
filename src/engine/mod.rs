//! Core engine — the fetch → simulate → detect scan.

pub mod scanner;
