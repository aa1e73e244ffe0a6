//! # Autochehol Telegram Bot
//!
//! A webhook-driven Telegram bot that walks customers through configuring a
//! set of car seat covers, answers common questions and collects requests
//! for a specialist or a manager.

pub mod bot;
pub mod catalog;
pub mod command;
pub mod config;
pub mod dialogue;
pub mod localization;
pub mod server;
pub mod session;
