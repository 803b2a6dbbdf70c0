//! Prompt injection into the conversation buffer
//!
//! This module provides the injector that places enabled prompts into
//! the chat right before a completion request is sent.

mod injector;

pub use injector::{
    inject, insertion_index, InjectablePrompt, Injection, InjectionFailure, InjectionReport,
};
