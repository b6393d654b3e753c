// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Drives a simple synchronous retry loop with decorrelated jitter delays.

use std::io::Error;
use std::time::Duration;

use ohno::AppError;
use retry_delays::decorrelated_jitter_backoff;

fn main() -> Result<(), AppError> {
    tracing::subscriber::set_global_default(tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).finish())?;

    // The first retry is immediate, the following ones back off.
    let delays = decorrelated_jitter_backoff(Duration::from_millis(10), Duration::from_millis(200), 5, None, true)?;

    let mut result = execute_operation();
    for delay in delays {
        if result.is_ok() {
            break;
        }

        println!("operation failed, retrying in {}ms", delay.as_millis());
        std::thread::sleep(delay);
        result = execute_operation();
    }

    match result {
        Ok(output) => println!("execution succeeded, result: {output}"),
        Err(e) => println!("execution failed, error: {e}"),
    }

    Ok(())
}

// 50% chance of failing with a transient error
fn execute_operation() -> Result<String, Error> {
    if fastrand::bool() {
        Err(Error::other("transient execution error"))
    } else {
        Ok("value".to_string())
    }
}
