// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::flexi_logger::{
    Logger,
    LoggerHandle,
};
use ::std::sync::{
    Once,
    OnceLock,
};

//======================================================================================================================
// Static Variables
//======================================================================================================================

/// Guardian to the logging initialize function.
static INIT_LOG: Once = Once::new();

/// Keeps the logger alive for the lifetime of the process.
static LOG_HANDLE: OnceLock<LoggerHandle> = OnceLock::new();

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Initializes logging features. The log specification is read from `RUST_LOG`, falling back to `default_spec`.
pub fn initialize(default_spec: &str) {
    INIT_LOG.call_once(|| {
        let logger: Logger = match Logger::try_with_env_or_str(default_spec) {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("invalid log specification ({:?}), logging disabled", e);
                return;
            },
        };
        match logger.start() {
            Ok(handle) => {
                let _ = LOG_HANDLE.set(handle);
            },
            Err(e) => eprintln!("failed to start logger: {:?}", e),
        }
    });
}
