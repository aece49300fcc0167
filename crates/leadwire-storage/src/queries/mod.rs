// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the persisted entities.

pub mod languages;
pub mod leads;
