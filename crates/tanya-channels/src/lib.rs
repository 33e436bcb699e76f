//! # Tanya Channels
//! Messaging front ends. The pipeline is transport-agnostic; a channel
//! only delivers user text in and display text + sources out.

pub mod telegram;
