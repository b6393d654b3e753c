// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Loads backoff policies from JSON configuration.

use ohno::AppError;
use retry_delays::BackoffConfig;

const CONFIG: &str = r#"[
    { "type": "constant", "delay_ms": 250, "retry_count": 3 },
    { "type": "exponential", "initial_delay_ms": 100, "retry_count": 5, "factor": 1.5, "fast_first": true },
    { "type": "decorrelated_jitter", "min_delay_ms": 10, "max_delay_ms": 1000, "retry_count": 5, "seed": 42 },
    { "type": "exponential", "initial_delay_ms": -100, "retry_count": 5 }
]"#;

fn main() -> Result<(), AppError> {
    let configs: Vec<BackoffConfig> = serde_json::from_str(CONFIG)?;

    for config in configs {
        match config.delays() {
            Ok(delays) => println!("{config:?} => {:?}", delays.collect::<Vec<_>>()),
            Err(e) => println!("{config:?} rejected: {e}"),
        }
    }

    Ok(())
}
