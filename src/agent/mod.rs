// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod client;
pub mod models;

pub use client::AgentClient;
