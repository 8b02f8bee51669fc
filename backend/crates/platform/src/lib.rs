//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random codes, constant-time compare)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - TTL cache store abstraction (Redis and in-memory)
//! - SMTP mailer
//! - SMS gateway client

pub mod cache;
pub mod crypto;
pub mod mailer;
pub mod password;
pub mod sms;
