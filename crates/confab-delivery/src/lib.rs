// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Real outbound delivery for Confab.
//!
//! [`HttpDelivery`] implements the `DeliveryAdapter` trait with one HTTP
//! call per message against a configured provider endpoint.

pub mod http;

pub use http::{HttpDelivery, HttpDeliveryConfig};
