use std::error::Error;

pub mod bookmarks;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod server;

#[cfg(test)]
mod testing;

pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
