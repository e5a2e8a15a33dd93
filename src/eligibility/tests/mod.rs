mod common;
mod entry;
