// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits implemented by pluggable adapters.

pub mod delivery;

pub use delivery::DeliveryAdapter;
