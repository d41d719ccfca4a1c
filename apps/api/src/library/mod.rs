// Answer library: reusable snippets that drafting quotes from.

pub mod handlers;
