// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shell hook installer for cdj.
//!
//! The cdj binary prints the directory that the user wants to jump to, but a
//! spawned process cannot change the working directory of the shell that
//! launched it. So, a small shell function named `cdj` is placed in the
//! user's shell configuration file. That function runs the real binary, and
//! changes directory to whatever it printed.
//!
//! This crate installs, upgrades, and removes that function as a
//! [`MarkedBlock`](block::MarkedBlock) of text. It picks which configuration
//! file to edit through [`shell`] candidate resolution, patches it through
//! [`patch`], and sequences both for package install or uninstall through
//! [`lifecycle`].

pub mod block;
pub mod config;
pub mod lifecycle;
pub mod patch;
pub mod path;
pub mod shell;
