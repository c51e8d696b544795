mod common;
mod engine;
mod validation;
