// Copyright (c) Microsoft. All rights reserved.

use std::num::ParseIntError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid value for --host parameter: {0}")]
    BadHostParameter(String),

    #[error("Invalid value for --port parameter")]
    BadPortParameter(#[source] ParseIntError),

    #[error("Invalid value for --timeout parameter")]
    BadTimeoutParameter(#[source] ParseIntError),

    /// Some checks did not pass. The report has already been printed.
    #[error("")]
    Diagnostics,

    #[error("Could not initialize tokio runtime")]
    InitializeTokio(#[source] std::io::Error),

    #[error("Could not write to stdout")]
    WriteToStdout(#[source] std::io::Error),
}
