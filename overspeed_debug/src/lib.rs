// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON-lines export for overspeed diagnostics.
//!
//! This crate provides [`TraceSink`](overspeed_core::trace::TraceSink)
//! implementations for development and headless runs:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`json::JsonLinesSink`] — one JSON object per event, for tooling.

pub mod json;
pub mod pretty;
