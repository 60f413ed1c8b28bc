// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registry credentials: the token source, decoded credentials, and the background refresher.

pub mod credential;
pub mod refresher;
pub mod source;

pub use credential::Credential;
pub use refresher::CredentialRefresher;
pub use source::{AuthorizationData, EcrTokenSource, TokenSource};
