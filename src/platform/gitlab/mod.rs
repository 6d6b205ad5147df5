mod client;
mod mapper;

pub use client::GitLabClient;
