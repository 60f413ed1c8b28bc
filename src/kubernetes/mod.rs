// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation and target namespace resolution.

pub mod client;
pub mod namespaces;

pub use client::create_client;
pub use namespaces::{list_target_namespaces, NamespaceSelector};
