// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport Error Types

use thiserror::Error;

/// Errors raised while moving frames to and from the relay.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid relay URL: {0}")]
    InvalidUrl(String),

    #[error("dial failed: {0}")]
    Dial(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("read failed: {0}")]
    Read(String),

    #[error("relay returned HTTP {0}")]
    Status(u16),

    #[error("response too large: exceeded {max} bytes")]
    ResponseTooLarge { max: usize },

    #[error("not connected")]
    NotConnected,

    #[error("inbound stream already taken")]
    StreamTaken,

    #[error("connection closed")]
    ConnectionClosed,
}
