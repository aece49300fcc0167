// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Leadwire integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a relay or a model API.
//!
//! # Components
//!
//! - [`MockRelay`] - Mock relay with notification injection and send capture
//! - [`MockResponder`] - Mock generative responder with pre-configured replies
//! - [`MockSink`] - Mock lead sink recording forwarded leads
//! - [`TestHarness`] - Controller wired to the mocks and a temp database

pub mod harness;
pub mod mock_relay;
pub mod mock_responder;
pub mod mock_sink;

pub use harness::TestHarness;
pub use mock_relay::{MockRelay, SentMessage};
pub use mock_responder::MockResponder;
pub use mock_sink::MockSink;
