//! End-to-end HTTP tests against an in-process service backed by the real
//! policy access backend, file-system store and XML engine.


mod propfind;
mod put;
