// Copyright (c) Microsoft. All rights reserved.

#![deny(rust_2018_idioms)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::use_self
)]

pub mod check;
pub mod client;
mod error;

pub use crate::check::{Check, CheckReport, Output, Summary};
pub use crate::client::{NodeClient, RequestError, RequestOutcome, DEFAULT_REQUEST_TIMEOUT};
pub use crate::error::Error;
